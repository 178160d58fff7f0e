//! Summary statistics
//!
//! Quick-look statistics for inspecting a design matrix and the per-animal
//! trial tables it was built from.

use crate::features::partition_by_animal;
use crate::normalizer::{mean, sample_std};
use crate::types::{DerivedTrial, DesignMatrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Statistics for one design-matrix column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Trial-level statistics for one animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSummary {
    pub animal_id: String,
    pub n_trials: usize,
    pub n_sessions: usize,
    pub violation_rate: f64,
    pub prev_trial_not_started_rate: f64,
    pub prev_disengaged_rate: f64,
}

/// Summarize every column of a design matrix
pub fn summarize_matrix(matrix: &DesignMatrix) -> Vec<ColumnSummary> {
    matrix
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values = matrix.values.column(idx).to_vec();
            ColumnSummary {
                column: name.clone(),
                count: values.len(),
                mean: mean(&values),
                std: sample_std(&values),
                min: values.iter().copied().reduce(f64::min),
                max: values.iter().copied().reduce(f64::max),
            }
        })
        .collect()
}

/// Summarize trials per animal, in order of first appearance
pub fn summarize_trials(trials: &[DerivedTrial]) -> Vec<AnimalSummary> {
    partition_by_animal(trials.to_vec())
        .into_iter()
        .map(|(animal_id, group)| {
            let n = group.len();
            let sessions: BTreeSet<i64> = group.iter().map(|t| t.record.session).collect();
            let rate = |count: usize| if n == 0 { 0.0 } else { count as f64 / n as f64 };

            AnimalSummary {
                animal_id,
                n_trials: n,
                n_sessions: sessions.len(),
                violation_rate: rate(group.iter().filter(|t| t.record.violation == 1).count()),
                prev_trial_not_started_rate: rate(
                    group.iter().filter(|t| t.lag.prev_trial_not_started).count(),
                ),
                prev_disengaged_rate: rate(group.iter().filter(|t| t.lag.prev_disengaged).count()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignMatrixGenerator;
    use crate::features::tests::make_trial;
    use crate::features::FeatureDeriver;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summarize_trials() {
        let mut records = vec![
            make_trial("W078", 1, 1, 1),
            make_trial("W078", 1, 2, 0),
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 2, 1, 0),
        ];
        records[3].n_prev_trial_not_started = 1;

        let summaries = summarize_trials(&FeatureDeriver::derive(records));

        assert_eq!(summaries.len(), 2);
        let w078 = &summaries[0];
        assert_eq!(w078.animal_id, "W078");
        assert_eq!(w078.n_trials, 3);
        assert_eq!(w078.n_sessions, 2);
        assert!((w078.violation_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((w078.prev_trial_not_started_rate - 1.0 / 3.0).abs() < 1e-12);
        // trial 2 follows a violation, trial 3 follows a not-started trial
        assert!((w078.prev_disengaged_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(summaries[1].n_trials, 1);
    }

    #[test]
    fn test_summarize_matrix() {
        let trials = FeatureDeriver::derive(vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
            make_trial("W078", 1, 3, 0),
        ]);
        let matrix = DesignMatrixGenerator::default().create(&trials).unwrap();

        let summary = summarize_matrix(&matrix);

        assert_eq!(summary.len(), matrix.n_columns());
        let bias = &summary[0];
        assert_eq!(bias.column, "bias");
        assert_eq!(bias.count, 3);
        assert_eq!(bias.mean, Some(1.0));
        assert_eq!(bias.std, Some(0.0));
        assert_eq!(bias.min, Some(1.0));
        assert_eq!(bias.max, Some(1.0));
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize_trials(&[]).is_empty());

        let matrix = DesignMatrixGenerator::default().create(&[]).unwrap();
        let summary = summarize_matrix(&matrix);
        assert_eq!(summary[0].count, 0);
        assert_eq!(summary[0].mean, None);
    }
}

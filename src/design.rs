//! Design matrix generation
//!
//! Builds the numeric model input for a single animal:
//!
//! | group | columns |
//! |-------|---------|
//! | bias | `bias` |
//! | stimulus | `s_a`, `s_b` (z-scored) |
//! | trial history | `prev_sound_avg`, `prev_correct`, `prev_choice` |
//! | engagement | `prev_disengaged`, or `prev_violation` + `prev_trial_not_started` |
//! | filtered history | one `{column}_exp_{tau}` per configured filter |
//! | interactions | one `{stimulus}_x_prev_violation_exp_{tau}` per configured term |
//!
//! Every column is computed on the animal's full, ordered trial table first so
//! lags and z-scores see the unfiltered sequence. Filters only decide which
//! rows are emitted.

use crate::config::{DesignConfig, LabelMode};
use crate::error::DesignError;
use crate::exp_filter::{ExpFilterSpec, HistoryColumn, Stimulus};
use crate::features::shift_within_session;
use crate::normalizer::Normalizer;
use crate::types::{Choice, DerivedTrial, DesignMatrix};
use ndarray::Array2;
use tracing::{debug, warn};

/// Design matrix generator for one animal's trials
#[derive(Debug, Clone, Default)]
pub struct DesignMatrixGenerator {
    config: DesignConfig,
}

impl DesignMatrixGenerator {
    pub fn new(config: DesignConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// Column names the generator emits, in order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            "bias",
            "s_a",
            "s_b",
            "prev_sound_avg",
            "prev_correct",
            "prev_choice",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for column in self.engagement_columns() {
            names.push(column.as_str().to_string());
        }
        for spec in &self.config.exp_filters {
            names.push(spec.output_name());
        }
        for interaction in &self.config.stim_interactions {
            names.push(interaction.output_name());
        }
        names
    }

    fn engagement_columns(&self) -> &'static [HistoryColumn] {
        if self.config.include_prev_disengaged {
            &[HistoryColumn::PrevDisengaged]
        } else {
            &[HistoryColumn::PrevViolation, HistoryColumn::PrevTrialNotStarted]
        }
    }

    /// Build the design matrix and labels for a single animal's ordered trials
    pub fn create(&self, trials: &[DerivedTrial]) -> Result<DesignMatrix, DesignError> {
        self.config.validate()?;
        let animal_id = single_animal(trials)?;
        let names = self.column_names();

        let keep = self.row_mask(trials)?;
        let columns = self.feature_columns(trials)?;
        debug_assert_eq!(columns.len(), names.len());

        let kept_rows: Vec<usize> = (0..trials.len()).filter(|&i| keep[i]).collect();
        let mut flat = Vec::with_capacity(kept_rows.len() * names.len());
        for &row in &kept_rows {
            flat.extend(columns.iter().map(|column| column[row]));
        }
        let values = Array2::from_shape_vec((kept_rows.len(), names.len()), flat)?;

        let labels = kept_rows
            .iter()
            .map(|&row| self.label(trials[row].record.choice()))
            .collect();
        let trial_keys = kept_rows
            .iter()
            .map(|&row| trials[row].record.key())
            .collect();

        if kept_rows.is_empty() && !trials.is_empty() {
            warn!(
                animal_id = animal_id.as_deref().unwrap_or(""),
                trials = trials.len(),
                "filters removed every trial"
            );
        }
        debug!(
            animal_id = animal_id.as_deref().unwrap_or(""),
            rows = kept_rows.len(),
            columns = names.len(),
            "built design matrix"
        );

        Ok(DesignMatrix {
            animal_id,
            columns: names,
            values,
            labels,
            trial_keys,
        })
    }

    fn row_mask(&self, trials: &[DerivedTrial]) -> Result<Vec<bool>, DesignError> {
        let mut keep = self.config.filter_params.mask(trials)?;
        if self.config.labels == LabelMode::Binary {
            for (flag, trial) in keep.iter_mut().zip(trials) {
                *flag &= trial.record.choice() != Choice::Violation;
            }
        }
        Ok(keep)
    }

    fn label(&self, choice: Choice) -> u8 {
        // Binary mode never reaches violations; the row mask drops them
        choice.code()
    }

    fn feature_columns(&self, trials: &[DerivedTrial]) -> Result<Vec<Vec<f64>>, DesignError> {
        let n = trials.len();
        let sessions: Vec<i64> = trials.iter().map(|t| t.record.session).collect();
        let s_a: Vec<f64> = trials.iter().map(|t| t.record.s_a).collect();
        let s_b: Vec<f64> = trials.iter().map(|t| t.record.s_b).collect();
        let prev_violation: Vec<bool> = trials.iter().map(|t| t.lag.prev_violation).collect();
        let z_a = Normalizer::standardize(&s_a);
        let z_b = Normalizer::standardize(&s_b);

        let mut columns = vec![
            vec![1.0; n],
            z_a.clone(),
            z_b.clone(),
            prev_sound_avg(&s_a, &s_b, &sessions, &prev_violation),
            prev_correct(trials, &sessions, &prev_violation),
            prev_choice(trials, &sessions),
        ];

        for column in self.engagement_columns() {
            columns.push(history_values(trials, *column));
        }
        for spec in &self.config.exp_filters {
            let source = filter_source(trials, spec);
            columns.push(spec.apply(&source, &sessions)?);
        }
        if !self.config.stim_interactions.is_empty() {
            let violations = history_values(trials, HistoryColumn::PrevViolation);
            for interaction in &self.config.stim_interactions {
                let stimulus = match interaction.stimulus {
                    Stimulus::SA => &z_a,
                    Stimulus::SB => &z_b,
                };
                columns.push(interaction.apply(stimulus, &violations, &sessions)?);
            }
        }

        Ok(columns)
    }
}

/// Check that every trial belongs to the same animal
fn single_animal(trials: &[DerivedTrial]) -> Result<Option<String>, DesignError> {
    let Some(first) = trials.first() else {
        return Ok(None);
    };
    let mut others: Vec<String> = Vec::new();
    for trial in trials {
        let id = &trial.record.animal_id;
        if id != &first.record.animal_id && !others.contains(id) {
            others.push(id.clone());
        }
    }
    if others.is_empty() {
        Ok(Some(first.record.animal_id.clone()))
    } else {
        let mut ids = vec![first.record.animal_id.clone()];
        ids.extend(others);
        Err(DesignError::MultipleAnimals(ids))
    }
}

fn history_values(trials: &[DerivedTrial], column: HistoryColumn) -> Vec<f64> {
    trials
        .iter()
        .map(|t| {
            let flag = match column {
                HistoryColumn::PrevViolation => t.lag.prev_violation,
                HistoryColumn::PrevTrialNotStarted => t.lag.prev_trial_not_started,
                HistoryColumn::PrevDisengaged => t.lag.prev_disengaged,
            };
            if flag {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Series an exponential filter runs over.
///
/// `prev_disengaged` counts a trial that follows both a violation and
/// not-started trials as 2 unless the filter binarizes it first.
fn filter_source(trials: &[DerivedTrial], spec: &ExpFilterSpec) -> Vec<f64> {
    if spec.column != HistoryColumn::PrevDisengaged || spec.binarize {
        return history_values(trials, spec.column);
    }
    history_values(trials, HistoryColumn::PrevViolation)
        .into_iter()
        .zip(history_values(trials, HistoryColumn::PrevTrialNotStarted))
        .map(|(violation, not_started)| violation + not_started)
        .collect()
}

/// Previous trial's z-scored average loudness; 0 at session starts and after violations
fn prev_sound_avg(s_a: &[f64], s_b: &[f64], sessions: &[i64], prev_violation: &[bool]) -> Vec<f64> {
    let avg = Normalizer::standardize(&Normalizer::pairwise_mean(s_a, s_b));
    mask_after_violation(shift_within_session(sessions, &avg, 0.0), prev_violation)
}

/// Previous correct side (L -1, R 1); 0 at session starts and after violations
fn prev_correct(trials: &[DerivedTrial], sessions: &[i64], prev_violation: &[bool]) -> Vec<f64> {
    let correct: Vec<f64> = trials
        .iter()
        .map(|t| if t.record.correct_side == 0 { -1.0 } else { 1.0 })
        .collect();
    mask_after_violation(shift_within_session(sessions, &correct, 0.0), prev_violation)
}

/// Previous choice (L -1, R 1, violation 0); 0 at session starts
fn prev_choice(trials: &[DerivedTrial], sessions: &[i64]) -> Vec<f64> {
    let choice: Vec<f64> = trials.iter().map(|t| t.record.choice().signed()).collect();
    shift_within_session(sessions, &choice, 0.0)
}

fn mask_after_violation(values: Vec<f64>, prev_violation: &[bool]) -> Vec<f64> {
    values
        .into_iter()
        .zip(prev_violation)
        .map(|(v, &masked)| if masked { 0.0 } else { v })
        .collect()
}

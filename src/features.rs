//! Trial history feature derivation
//!
//! This module derives lagged, causal features from an ordered trial table:
//! - Previous-trial violation (reset at session boundaries)
//! - Previous trial not started
//! - Previous disengaged (either of the above)
//!
//! Subjects are tracked independently, so interleaved subjects in the input
//! never see each other's history and rows are never reordered.

use crate::types::{DerivedTrial, LagFeatures, TrialRecord};
use std::collections::HashMap;
use tracing::debug;

/// Last trial seen for a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousTrial {
    pub session: i64,
    pub violation: u8,
}

impl From<&TrialRecord> for PreviousTrial {
    fn from(record: &TrialRecord) -> Self {
        Self {
            session: record.session,
            violation: record.violation,
        }
    }
}

/// Feature deriver for computing trial history features
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive history features for every record, preserving input order
    pub fn derive(records: Vec<TrialRecord>) -> Vec<DerivedTrial> {
        let mut last_by_animal: HashMap<String, PreviousTrial> = HashMap::new();
        let mut derived = Vec::with_capacity(records.len());

        for record in records {
            let previous = last_by_animal.get(&record.animal_id).copied();
            let lag = Self::lag_features(&record, previous);

            match last_by_animal.get_mut(&record.animal_id) {
                Some(last) => *last = PreviousTrial::from(&record),
                None => {
                    last_by_animal.insert(record.animal_id.clone(), PreviousTrial::from(&record));
                }
            }

            derived.push(DerivedTrial { record, lag });
        }

        debug!(
            trials = derived.len(),
            animals = last_by_animal.len(),
            "derived trial history features"
        );

        derived
    }

    /// Compute features for one record given the subject's previous trial
    pub fn lag_features(record: &TrialRecord, previous: Option<PreviousTrial>) -> LagFeatures {
        let prev_violation = match previous {
            Some(prev) if prev.session == record.session => prev.violation == 1,
            _ => false,
        };
        let prev_trial_not_started = record.n_prev_trial_not_started != 0;

        LagFeatures {
            prev_violation,
            prev_trial_not_started,
            prev_disengaged: prev_trial_not_started || prev_violation,
        }
    }
}

/// Group trials by subject in order of first appearance.
///
/// Trials keep their relative order within each subject.
pub fn partition_by_animal(trials: Vec<DerivedTrial>) -> Vec<(String, Vec<DerivedTrial>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<DerivedTrial>)> = Vec::new();

    for trial in trials {
        let slot = match index.get(&trial.record.animal_id) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                index.insert(trial.record.animal_id.clone(), slot);
                groups.push((trial.record.animal_id.clone(), Vec::new()));
                slot
            }
        };
        groups[slot].1.push(trial);
    }

    groups
}

/// Shift `values` down by one trial, filling the first trial of every session.
///
/// `sessions` and `values` must belong to a single subject and be aligned.
pub fn shift_within_session<T: Copy>(sessions: &[i64], values: &[T], fill: T) -> Vec<T> {
    debug_assert_eq!(sessions.len(), values.len());

    (0..values.len())
        .map(|i| {
            if i > 0 && sessions[i - 1] == sessions[i] {
                values[i - 1]
            } else {
                fill
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn make_trial(animal_id: &str, session: i64, trial: u32, violation: u8) -> TrialRecord {
        TrialRecord {
            animal_id: animal_id.to_string(),
            session,
            trial,
            violation,
            n_prev_trial_not_started: 0,
            s_a: 60.0 + f64::from(trial),
            s_b: 68.0 - f64::from(trial),
            correct_side: (trial % 2) as u8,
            choice: if violation == 1 { None } else { Some((trial % 2) as u8) },
        }
    }

    fn prev_violations(derived: &[DerivedTrial]) -> Vec<bool> {
        derived.iter().map(|d| d.lag.prev_violation).collect()
    }

    #[test]
    fn test_prev_violation_resets_at_session_boundary() {
        let records = vec![
            make_trial("W078", 1, 1, 1),
            make_trial("W078", 1, 2, 0),
            make_trial("W078", 2, 1, 1),
        ];

        let derived = FeatureDeriver::derive(records);

        assert_eq!(prev_violations(&derived), vec![false, true, false]);
    }

    #[test]
    fn test_prev_violation_carries_within_session() {
        let records = vec![
            make_trial("W078", 3, 1, 0),
            make_trial("W078", 3, 2, 1),
            make_trial("W078", 3, 3, 1),
            make_trial("W078", 3, 4, 0),
        ];

        let derived = FeatureDeriver::derive(records.clone());

        for i in 1..records.len() {
            assert_eq!(derived[i].lag.prev_violation, records[i - 1].violation == 1);
        }
    }

    #[test]
    fn test_last_trial_of_session_does_not_leak() {
        // Previous session ends on a violation; the next session must start clean
        let records = vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W078", 1, 2, 1),
            make_trial("W078", 2, 1, 0),
        ];

        let derived = FeatureDeriver::derive(records);

        assert!(!derived[2].lag.prev_violation);
    }

    #[test]
    fn test_prev_trial_not_started() {
        let mut records = vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
            make_trial("W078", 1, 3, 0),
        ];
        records[1].n_prev_trial_not_started = 2;

        let derived = FeatureDeriver::derive(records);
        let not_started: Vec<bool> = derived.iter().map(|d| d.lag.prev_trial_not_started).collect();

        assert_eq!(not_started, vec![false, true, false]);
    }

    #[test]
    fn test_prev_disengaged_is_or_of_both() {
        let mut records = vec![
            make_trial("W078", 1, 1, 1),
            make_trial("W078", 1, 2, 0),
            make_trial("W078", 1, 3, 0),
            make_trial("W078", 1, 4, 0),
        ];
        records[2].n_prev_trial_not_started = 1;

        let derived = FeatureDeriver::derive(records);

        for d in &derived {
            assert_eq!(
                d.lag.prev_disengaged,
                d.lag.prev_trial_not_started || d.lag.prev_violation
            );
        }
        let disengaged: Vec<bool> = derived.iter().map(|d| d.lag.prev_disengaged).collect();
        assert_eq!(disengaged, vec![false, true, true, false]);
    }

    #[test]
    fn test_interleaved_animals_are_independent() {
        let records = vec![
            make_trial("W078", 1, 1, 1),
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
            make_trial("W080", 1, 2, 0),
        ];

        let derived = FeatureDeriver::derive(records);

        // Order is preserved and each animal only sees its own history
        let ids: Vec<&str> = derived.iter().map(|d| d.record.animal_id.as_str()).collect();
        assert_eq!(ids, vec!["W078", "W080", "W078", "W080"]);
        assert_eq!(prev_violations(&derived), vec![false, false, true, false]);
    }

    #[test]
    fn test_first_trial_of_new_animal_resets() {
        // Same session index for a different animal must not carry history
        let records = vec![make_trial("W078", 1, 1, 1), make_trial("W080", 1, 1, 0)];

        let derived = FeatureDeriver::derive(records);

        assert!(!derived[1].lag.prev_violation);
    }

    #[test]
    fn test_partition_by_animal_preserves_order() {
        let records = vec![
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 1, 1, 0),
            make_trial("W080", 1, 2, 0),
            make_trial("W078", 1, 2, 0),
        ];

        let groups = partition_by_animal(FeatureDeriver::derive(records));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "W080");
        assert_eq!(groups[1].0, "W078");
        let trials: Vec<u32> = groups[0].1.iter().map(|d| d.record.trial).collect();
        assert_eq!(trials, vec![1, 2]);
    }

    #[test]
    fn test_shift_within_session() {
        let sessions = [1, 1, 1, 2, 2];
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];

        let shifted = shift_within_session(&sessions, &values, 0.0);

        assert_eq!(shifted, vec![0.0, 10.0, 20.0, 0.0, 40.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(FeatureDeriver::derive(Vec::new()).is_empty());
        assert!(shift_within_session::<f64>(&[], &[], 0.0).is_empty());
    }
}

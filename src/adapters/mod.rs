//! Trial data sources
//!
//! This module provides sources that load behavioral trial records for a set of
//! animals. Storage and querying stay outside the crate; sources only parse and
//! validate conforming rows.

mod dataset;
mod file;
mod records;

pub use dataset::DatasetSource;
pub use file::{FileSource, InputFormat};
pub use records::{RecordParser, ValidationResult};

use crate::error::DesignError;
use crate::types::TrialRecord;

/// Trait for trial data sources
pub trait TrialSource {
    /// Load trials for `animal_ids` (every animal when empty) from the dataset
    /// identified by `data_type`
    fn load(&self, animal_ids: &[String], data_type: &str) -> Result<Vec<TrialRecord>, DesignError>;
}

/// Source backed by records already in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<TrialRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<TrialRecord>) -> Self {
        Self { records }
    }
}

impl TrialSource for MemorySource {
    fn load(&self, animal_ids: &[String], _data_type: &str) -> Result<Vec<TrialRecord>, DesignError> {
        RecordParser::validate_all(&self.records)?;
        Ok(select_animals(self.records.clone(), animal_ids))
    }
}

/// Keep only the requested animals, preserving row order
pub(crate) fn select_animals(records: Vec<TrialRecord>, animal_ids: &[String]) -> Vec<TrialRecord> {
    if animal_ids.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| animal_ids.iter().any(|id| id == &r.animal_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::make_trial;

    #[test]
    fn test_memory_source_selects_animals() {
        let source = MemorySource::new(vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
        ]);

        let all = source.load(&[], "violation").unwrap();
        assert_eq!(all.len(), 3);

        let w078 = source.load(&["W078".to_string()], "violation").unwrap();
        assert_eq!(w078.len(), 2);
        assert!(w078.iter().all(|r| r.animal_id == "W078"));
        assert_eq!(w078[1].trial, 2);
    }

    #[test]
    fn test_memory_source_rejects_invalid_records() {
        let mut bad = make_trial("W078", 1, 1, 0);
        bad.violation = 3;
        let source = MemorySource::new(vec![make_trial("W078", 1, 1, 0), bad]);

        let err = source.load(&[], "violation").unwrap_err();

        assert!(matches!(err, DesignError::InvalidRecord { index: 1, .. }));
    }
}

//! Processed dataset directory source
//!
//! Resolves `{root}/processed/{data_type}_data.ndjson` and reads it through a
//! [`FileSource`].

use super::{FileSource, InputFormat, TrialSource};
use crate::config::DataConfig;
use crate::error::DesignError;
use crate::types::TrialRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// Trial source rooted at a processed data directory
#[derive(Debug, Clone)]
pub struct DatasetSource {
    root: PathBuf,
}

impl DatasetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Source rooted wherever the data configuration resolves to
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.resolve_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding a dataset
    pub fn dataset_path(&self, data_type: &str) -> PathBuf {
        self.root
            .join("processed")
            .join(format!("{data_type}_data.ndjson"))
    }
}

impl TrialSource for DatasetSource {
    fn load(&self, animal_ids: &[String], data_type: &str) -> Result<Vec<TrialRecord>, DesignError> {
        let path = self.dataset_path(data_type);
        if animal_ids.is_empty() {
            info!(dataset = data_type, "returning dataset for all animals");
        } else {
            info!(dataset = data_type, animals = ?animal_ids, "returning data for selected animals");
        }
        FileSource::new(path, InputFormat::Ndjson).load(animal_ids, data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_dataset_path_layout() {
        let source = DatasetSource::new("/data");
        assert_eq!(
            source.dataset_path("violation"),
            PathBuf::from("/data/processed/violation_data.ndjson")
        );
    }

    #[test]
    fn test_load_from_root() {
        let root = std::env::temp_dir().join(format!("vglm-root-{}", Uuid::new_v4()));
        fs::create_dir_all(root.join("processed")).unwrap();
        fs::write(
            root.join("processed/violation_data.ndjson"),
            r#"{"animal_id": "W078", "session": 1, "trial": 1, "violation": 0, "s_a": 60.0, "s_b": 68.0, "correct_side": 1, "choice": 1}"#,
        )
        .unwrap();

        let source = DatasetSource::new(&root);
        let records = source.load(&[], "violation").unwrap();
        assert_eq!(records.len(), 1);

        assert!(matches!(
            source.load(&[], "choice"),
            Err(DesignError::DatasetNotFound(_))
        ));

        fs::remove_dir_all(root).unwrap();
    }
}

//! Single-file trial source

use super::{select_animals, RecordParser, TrialSource};
use crate::error::DesignError;
use crate::types::TrialRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk layout of a trial file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Newline-delimited JSON (one trial per line)
    #[default]
    Ndjson,
    /// JSON array of trials
    Json,
}

impl InputFormat {
    /// Guess the format from a file extension, defaulting to NDJSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => InputFormat::Json,
            _ => InputFormat::Ndjson,
        }
    }

    pub fn parse(&self, content: &str) -> Result<Vec<TrialRecord>, DesignError> {
        match self {
            InputFormat::Ndjson => RecordParser::parse_ndjson(content),
            InputFormat::Json => RecordParser::parse_array(content),
        }
    }
}

/// Trial source reading one NDJSON or JSON file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: InputFormat,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, format: InputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Source whose format is inferred from the file extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = InputFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrialSource for FileSource {
    fn load(&self, animal_ids: &[String], data_type: &str) -> Result<Vec<TrialRecord>, DesignError> {
        if !self.path.exists() {
            return Err(DesignError::DatasetNotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        let records = self.format.parse(&content)?;
        RecordParser::validate_all(&records)?;

        let selected = select_animals(records, animal_ids);
        debug!(
            path = %self.path.display(),
            data_type,
            trials = selected.len(),
            "loaded trials from file"
        );
        Ok(selected)
    }
}

//! Error types for violation-glm

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading trials or building design matrices
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Failed to parse trial data: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid trial record at row {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: RecordError,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("More than one animal in design table: {0:?}")]
    MultipleAnimals(Vec<String>),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("Design matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Errors in user-supplied design configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Unknown filter column: {0}")]
    UnknownFilterColumn(String),

    #[error("Filter value for column `{column}` must be {expected}")]
    FilterTypeMismatch { column: String, expected: String },

    #[error("Invalid filter expression `{0}` (expected key=value)")]
    InvalidFilterExpression(String),

    #[error("Exponential filter tau must be positive, got {0}")]
    InvalidTau(u32),

    #[error("Exponential filter tau must be a positive integer, got `{0}`")]
    UnparseableTau(String),

    #[error("Unknown stimulus for interaction column: {0} (expected s_a or s_b)")]
    UnknownStimulus(String),

    #[error("Unknown history column for exponential filter: {0}")]
    UnknownHistoryColumn(String),
}

/// Validation errors for a single trial record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("violation must be 0 or 1, got {0}")]
    InvalidViolation(u8),

    #[error("correct_side must be 0 or 1, got {0}")]
    InvalidCorrectSide(u8),

    #[error("choice must be 0, 1 or 2, got {0}")]
    InvalidChoice(u8),

    #[error("choice {choice} is inconsistent with violation {violation}")]
    InconsistentChoice { choice: u8, violation: u8 },

    #[error("stimulus `{0}` is not finite")]
    NonFiniteStimulus(&'static str),
}

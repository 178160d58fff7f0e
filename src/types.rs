//! Core types for the violation-glm pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw trial records, derived trials with history features, the
//! design matrix, and the JSON payload emitted for downstream models.

use crate::error::RecordError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Animal choice on a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Left,
    Right,
    Violation,
}

impl Choice {
    /// Integer code used in the source dataset (L=0, R=1, violation=2)
    pub fn code(&self) -> u8 {
        match self {
            Choice::Left => 0,
            Choice::Right => 1,
            Choice::Violation => 2,
        }
    }

    /// Signed code for history regressors (L=-1, R=1, violation=0)
    pub fn signed(&self) -> f64 {
        match self {
            Choice::Left => -1.0,
            Choice::Right => 1.0,
            Choice::Violation => 0.0,
        }
    }
}

/// One behavioral trial as provided by the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Subject identifier
    pub animal_id: String,
    /// Session index (resets per subject)
    pub session: i64,
    /// Trial index within the session
    pub trial: u32,
    /// Violation outcome flag (0/1)
    pub violation: u8,
    /// Consecutive prior trials the animal did not start
    #[serde(default)]
    pub n_prev_trial_not_started: u32,
    /// Loudness of the first tone
    pub s_a: f64,
    /// Loudness of the second tone
    pub s_b: f64,
    /// Correct side (0 = left, 1 = right)
    pub correct_side: u8,
    /// Choice code (0 = left, 1 = right, 2 or absent = violation)
    #[serde(default)]
    pub choice: Option<u8>,
}

impl TrialRecord {
    /// Resolve the trial's choice, treating violations as their own class
    pub fn choice(&self) -> Choice {
        if self.violation == 1 {
            return Choice::Violation;
        }
        match self.choice {
            Some(0) => Choice::Left,
            Some(1) => Choice::Right,
            _ => Choice::Violation,
        }
    }

    /// Unique key of this trial
    pub fn key(&self) -> TrialKey {
        TrialKey {
            animal_id: self.animal_id.clone(),
            session: self.session,
            trial: self.trial,
        }
    }

    /// Check value ranges and choice/violation consistency
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.violation > 1 {
            return Err(RecordError::InvalidViolation(self.violation));
        }
        if self.correct_side > 1 {
            return Err(RecordError::InvalidCorrectSide(self.correct_side));
        }
        if let Some(choice) = self.choice {
            if choice > 2 {
                return Err(RecordError::InvalidChoice(choice));
            }
            let is_violation_choice = choice == 2;
            if is_violation_choice != (self.violation == 1) {
                return Err(RecordError::InconsistentChoice {
                    choice,
                    violation: self.violation,
                });
            }
        }
        if !self.s_a.is_finite() {
            return Err(RecordError::NonFiniteStimulus("s_a"));
        }
        if !self.s_b.is_finite() {
            return Err(RecordError::NonFiniteStimulus("s_b"));
        }
        Ok(())
    }
}

/// `(animal_id, session, trial)` key of a trial
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialKey {
    pub animal_id: String,
    pub session: i64,
    pub trial: u32,
}

/// History features derived for one trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagFeatures {
    /// Previous trial in the same session was a violation
    pub prev_violation: bool,
    /// The animal failed to start at least one trial before this one
    pub prev_trial_not_started: bool,
    /// Either of the above
    pub prev_disengaged: bool,
}

/// A trial record together with its history features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTrial {
    #[serde(flatten)]
    pub record: TrialRecord,
    #[serde(flatten)]
    pub lag: LagFeatures,
}

/// Value kind of a named trial column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Str,
    Int,
    Float,
    Bool,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Str => "a string",
            ColumnKind::Int => "an integer",
            ColumnKind::Float => "a number",
            ColumnKind::Bool => "a boolean or 0/1",
        }
    }
}

/// Borrowed value of one cell of a derived trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl DerivedTrial {
    /// Named columns addressable by filters, in table order
    pub const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("animal_id", ColumnKind::Str),
        ("session", ColumnKind::Int),
        ("trial", ColumnKind::Int),
        ("violation", ColumnKind::Int),
        ("n_prev_trial_not_started", ColumnKind::Int),
        ("s_a", ColumnKind::Float),
        ("s_b", ColumnKind::Float),
        ("correct_side", ColumnKind::Int),
        ("choice", ColumnKind::Int),
        ("prev_violation", ColumnKind::Bool),
        ("prev_trial_not_started", ColumnKind::Bool),
        ("prev_disengaged", ColumnKind::Bool),
    ];

    /// Kind of a named column, if it exists
    pub fn column_kind(name: &str) -> Option<ColumnKind> {
        Self::COLUMNS
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, kind)| *kind)
    }

    /// Look up a cell by column name
    pub fn column(&self, name: &str) -> Option<ColumnValue<'_>> {
        let r = &self.record;
        let value = match name {
            "animal_id" => ColumnValue::Str(&r.animal_id),
            "session" => ColumnValue::Int(r.session),
            "trial" => ColumnValue::Int(i64::from(r.trial)),
            "violation" => ColumnValue::Int(i64::from(r.violation)),
            "n_prev_trial_not_started" => ColumnValue::Int(i64::from(r.n_prev_trial_not_started)),
            "s_a" => ColumnValue::Float(r.s_a),
            "s_b" => ColumnValue::Float(r.s_b),
            "correct_side" => ColumnValue::Int(i64::from(r.correct_side)),
            "choice" => ColumnValue::Int(i64::from(r.choice().code())),
            "prev_violation" => ColumnValue::Bool(self.lag.prev_violation),
            "prev_trial_not_started" => ColumnValue::Bool(self.lag.prev_trial_not_started),
            "prev_disengaged" => ColumnValue::Bool(self.lag.prev_disengaged),
            _ => return None,
        };
        Some(value)
    }
}

/// Numeric design matrix with named columns and aligned labels
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// Subject the matrix was built for (None for an empty table)
    pub animal_id: Option<String>,
    /// Column names, in matrix column order
    pub columns: Vec<String>,
    /// Row-major feature values, shape (n_trials, n_columns)
    pub values: Array2<f64>,
    /// Class label per row
    pub labels: Vec<u8>,
    /// Key of the trial each row came from
    pub trial_keys: Vec<TrialKey>,
}

impl DesignMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// View of a single named column
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name)
            .map(|idx| self.values.column(idx))
    }
}

/// Design payload producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Serialized design matrix for downstream model fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignPayload {
    pub format_version: String,
    pub producer: DesignProducer,
    pub generated_at_utc: String,
    pub animal_id: Option<String>,
    pub n_trials: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub label_mode: String,
    pub trial_keys: Vec<TrialKey>,
    pub filter_params: serde_json::Value,
    pub include_prev_disengaged: bool,
}

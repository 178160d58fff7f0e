//! Row filtering by column equality predicates

use crate::error::ConfigurationError;
use crate::types::{ColumnKind, ColumnValue, DerivedTrial};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Scalar value a filtered column must equal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FromStr for FilterValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = if let Ok(b) = s.parse::<bool>() {
            FilterValue::Bool(b)
        } else if let Ok(i) = s.parse::<i64>() {
            FilterValue::Int(i)
        } else if let Ok(f) = s.parse::<f64>() {
            FilterValue::Float(f)
        } else {
            FilterValue::Str(s.to_string())
        };
        Ok(value)
    }
}

impl FilterValue {
    fn compatible_with(&self, kind: ColumnKind) -> bool {
        match (kind, self) {
            (ColumnKind::Str, FilterValue::Str(_)) => true,
            (ColumnKind::Int | ColumnKind::Float, FilterValue::Int(_) | FilterValue::Float(_)) => {
                true
            }
            (ColumnKind::Bool, FilterValue::Bool(_)) => true,
            (ColumnKind::Bool, FilterValue::Int(i)) => *i == 0 || *i == 1,
            _ => false,
        }
    }

    fn matches(&self, cell: ColumnValue<'_>) -> bool {
        match (cell, self) {
            (ColumnValue::Str(a), FilterValue::Str(b)) => a == b.as_str(),
            (ColumnValue::Int(a), FilterValue::Int(b)) => a == *b,
            (ColumnValue::Int(a), FilterValue::Float(b)) => a as f64 == *b,
            (ColumnValue::Float(a), FilterValue::Int(b)) => a == *b as f64,
            (ColumnValue::Float(a), FilterValue::Float(b)) => a == *b,
            (ColumnValue::Bool(a), FilterValue::Bool(b)) => a == *b,
            (ColumnValue::Bool(a), FilterValue::Int(b)) => i64::from(a) == *b,
            _ => false,
        }
    }
}

/// Equality predicates combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterParams(BTreeMap<String, FilterValue>);

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FilterValue) {
        self.0.insert(column.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Merge `other` into `self`, overriding duplicate columns
    pub fn extend(&mut self, other: FilterParams) {
        self.0.extend(other.0);
    }

    /// Check every key names a trial column and every value can compare to it
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (column, value) in &self.0 {
            let kind = DerivedTrial::column_kind(column)
                .ok_or_else(|| ConfigurationError::UnknownFilterColumn(column.clone()))?;
            if !value.compatible_with(kind) {
                return Err(ConfigurationError::FilterTypeMismatch {
                    column: column.clone(),
                    expected: kind.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a trial satisfies every predicate. Call `validate` first.
    pub fn matches(&self, trial: &DerivedTrial) -> bool {
        self.0.iter().all(|(column, value)| {
            trial
                .column(column)
                .map(|cell| value.matches(cell))
                .unwrap_or(false)
        })
    }

    /// Keep the trials that satisfy every predicate, preserving order
    pub fn apply(&self, trials: &[DerivedTrial]) -> Result<Vec<DerivedTrial>, ConfigurationError> {
        self.validate()?;
        Ok(trials.iter().filter(|t| self.matches(t)).cloned().collect())
    }

    /// Per-row keep mask, aligned with `trials`
    pub fn mask(&self, trials: &[DerivedTrial]) -> Result<Vec<bool>, ConfigurationError> {
        self.validate()?;
        Ok(trials.iter().map(|t| self.matches(t)).collect())
    }

    /// Parse a `column=value` expression
    pub fn parse_expression(expr: &str) -> Result<(String, FilterValue), ConfigurationError> {
        let (column, raw) = expr
            .split_once('=')
            .ok_or_else(|| ConfigurationError::InvalidFilterExpression(expr.to_string()))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(ConfigurationError::InvalidFilterExpression(expr.to_string()));
        }
        let value = match raw.trim().parse::<FilterValue>() {
            Ok(value) => value,
            Err(never) => match never {},
        };
        Ok((column.to_string(), value))
    }
}

impl FromIterator<(String, FilterValue)> for FilterParams {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

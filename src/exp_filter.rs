//! Exponential history filters
//!
//! Convolves a binary history column with a decaying kernel
//! `k[i] = exp(-i / tau)` so the design matrix can carry a smoothed trace of
//! recent events. The convolution is causal and restarts at every session
//! boundary.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default kernel length as a multiple of tau
pub const DEFAULT_LEN_FACTOR: u32 = 5;

/// History column an exponential filter can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryColumn {
    PrevViolation,
    PrevTrialNotStarted,
    PrevDisengaged,
}

impl HistoryColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryColumn::PrevViolation => "prev_violation",
            HistoryColumn::PrevTrialNotStarted => "prev_trial_not_started",
            HistoryColumn::PrevDisengaged => "prev_disengaged",
        }
    }
}

impl fmt::Display for HistoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryColumn {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev_violation" => Ok(HistoryColumn::PrevViolation),
            "prev_trial_not_started" => Ok(HistoryColumn::PrevTrialNotStarted),
            "prev_disengaged" => Ok(HistoryColumn::PrevDisengaged),
            other => Err(ConfigurationError::UnknownHistoryColumn(other.to_string())),
        }
    }
}

fn default_len_factor() -> u32 {
    DEFAULT_LEN_FACTOR
}

fn default_scale() -> bool {
    true
}

/// One exponentially filtered design column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpFilterSpec {
    pub column: HistoryColumn,
    pub tau: u32,
    #[serde(default = "default_len_factor")]
    pub len_factor: u32,
    /// Scale the filtered column so its maximum is 1
    #[serde(default = "default_scale")]
    pub scale: bool,
    /// For `prev_disengaged`, filter the 0/1 OR instead of the 0..2 sum of
    /// `prev_violation` and `prev_trial_not_started`
    #[serde(default)]
    pub binarize: bool,
}

impl ExpFilterSpec {
    pub fn new(column: HistoryColumn, tau: u32) -> Self {
        Self {
            column,
            tau,
            len_factor: DEFAULT_LEN_FACTOR,
            scale: true,
            binarize: false,
        }
    }

    /// Design-matrix column name, e.g. `prev_violation_exp_3`
    pub fn output_name(&self) -> String {
        format!("{}_exp_{}", self.column, self.tau)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tau == 0 {
            return Err(ConfigurationError::InvalidTau(self.tau));
        }
        Ok(())
    }

    /// Nominal kernel length, `len_factor * tau` (at least one tap)
    pub fn kernel_len(&self) -> usize {
        (self.len_factor.max(1) as usize)
            .saturating_mul(self.tau as usize)
            .max(1)
    }

    /// Decaying kernel truncated to `max_len` taps
    pub fn kernel(&self, max_len: usize) -> Vec<f64> {
        let len = self.kernel_len().min(max_len.max(1));
        let tau = f64::from(self.tau);
        (0..len).map(|i| (-(i as f64) / tau).exp()).collect()
    }

    /// Filter `values`, restarting the convolution at every session change
    pub fn apply(&self, values: &[f64], sessions: &[i64]) -> Result<Vec<f64>, ConfigurationError> {
        self.validate()?;
        debug_assert_eq!(values.len(), sessions.len());

        // taps past the series length never contribute
        let kernel = self.kernel(values.len());
        let mut out = vec![0.0; values.len()];
        let mut session_start = 0;

        for t in 0..values.len() {
            if t > 0 && sessions[t] != sessions[t - 1] {
                session_start = t;
            }
            let span = (t - session_start + 1).min(kernel.len());
            out[t] = (0..span).map(|i| kernel[i] * values[t - i]).sum();
        }

        if self.scale {
            let max = out.iter().copied().fold(0.0_f64, f64::max);
            if max > 0.0 {
                out.iter_mut().for_each(|v| *v /= max);
            }
        }

        Ok(out)
    }

    /// Parse a `column:tau` expression
    pub fn parse_expression(expr: &str) -> Result<Self, ConfigurationError> {
        let (column, tau) = expr
            .split_once(':')
            .ok_or_else(|| ConfigurationError::UnknownHistoryColumn(expr.to_string()))?;
        let column: HistoryColumn = column.trim().parse()?;
        let spec = Self::new(column, parse_tau(tau)?);
        spec.validate()?;
        Ok(spec)
    }
}

fn parse_tau(raw: &str) -> Result<u32, ConfigurationError> {
    let raw = raw.trim();
    raw.parse()
        .map_err(|_| ConfigurationError::UnparseableTau(raw.to_string()))
}

/// Stimulus column an interaction term is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    #[serde(rename = "s_a")]
    SA,
    #[serde(rename = "s_b")]
    SB,
}

impl Stimulus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stimulus::SA => "s_a",
            Stimulus::SB => "s_b",
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stimulus {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s_a" => Ok(Stimulus::SA),
            "s_b" => Ok(Stimulus::SB),
            other => Err(ConfigurationError::UnknownStimulus(other.to_string())),
        }
    }
}

/// Z-scored stimulus times the filtered `prev_violation` trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimViolationInteraction {
    pub stimulus: Stimulus,
    pub tau: u32,
    #[serde(default = "default_len_factor")]
    pub len_factor: u32,
    #[serde(default = "default_scale")]
    pub scale: bool,
}

impl StimViolationInteraction {
    pub fn new(stimulus: Stimulus, tau: u32) -> Self {
        Self {
            stimulus,
            tau,
            len_factor: DEFAULT_LEN_FACTOR,
            scale: true,
        }
    }

    /// Design-matrix column name, e.g. `s_a_x_prev_violation_exp_3`
    pub fn output_name(&self) -> String {
        format!("{}_x_prev_violation_exp_{}", self.stimulus, self.tau)
    }

    /// The violation filter the stimulus is multiplied with
    pub fn violation_filter(&self) -> ExpFilterSpec {
        ExpFilterSpec {
            len_factor: self.len_factor,
            scale: self.scale,
            ..ExpFilterSpec::new(HistoryColumn::PrevViolation, self.tau)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.violation_filter().validate()
    }

    /// Element-wise product of a standardized stimulus and the violation filter
    pub fn apply(
        &self,
        stimulus: &[f64],
        prev_violation: &[f64],
        sessions: &[i64],
    ) -> Result<Vec<f64>, ConfigurationError> {
        let filtered = self.violation_filter().apply(prev_violation, sessions)?;
        Ok(stimulus.iter().zip(filtered).map(|(s, f)| s * f).collect())
    }

    /// Parse a `stimulus:tau` expression
    pub fn parse_expression(expr: &str) -> Result<Self, ConfigurationError> {
        let (stimulus, tau) = expr
            .split_once(':')
            .ok_or_else(|| ConfigurationError::UnknownStimulus(expr.to_string()))?;
        let stimulus: Stimulus = stimulus.trim().parse()?;
        let interaction = Self::new(stimulus, parse_tau(tau)?);
        interaction.validate()?;
        Ok(interaction)
    }
}

//! Design and dataset configuration
//!
//! `DesignConfig` mirrors the parameters a design-matrix run accepts and can be
//! loaded from a JSON file. `DataConfig` resolves where processed trial data
//! lives for local runs versus the shared cluster mount.

use crate::error::{ConfigurationError, DesignError};
use crate::exp_filter::{ExpFilterSpec, StimViolationInteraction};
use crate::filter::FilterParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root
pub const DATA_ROOT_ENV: &str = "VGLM_DATA_ROOT";

/// Default dataset tag (resolves to `processed/violation_data.ndjson`)
pub const DEFAULT_DATASET: &str = "violation";

/// How labels are encoded in the design output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Left 0, right 1; violation trials are dropped
    Binary,
    /// Left 0, right 1, violation 2
    #[default]
    Multi,
}

impl LabelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelMode::Binary => "binary",
            LabelMode::Multi => "multi",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parameters for building a design matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Equality predicates rows must satisfy
    #[serde(default)]
    pub filter_params: FilterParams,
    /// Use `prev_disengaged` instead of `prev_violation` + `prev_trial_not_started`
    #[serde(default = "default_true")]
    pub include_prev_disengaged: bool,
    #[serde(default)]
    pub labels: LabelMode,
    #[serde(default)]
    pub exp_filters: Vec<ExpFilterSpec>,
    /// Stimulus × filtered `prev_violation` columns
    #[serde(default)]
    pub stim_interactions: Vec<StimViolationInteraction>,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            filter_params: FilterParams::default(),
            include_prev_disengaged: true,
            labels: LabelMode::default(),
            exp_filters: Vec::new(),
            stim_interactions: Vec::new(),
        }
    }
}

impl DesignConfig {
    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        let config: DesignConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, DesignError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.filter_params.validate()?;
        for spec in &self.exp_filters {
            spec.validate()?;
        }
        for interaction in &self.stim_interactions {
            interaction.validate()?;
        }
        Ok(())
    }
}

/// Where the data root is resolved from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    #[default]
    Local,
    Cluster,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_cluster_root() -> PathBuf {
    PathBuf::from("/Volumes/brody/jbreda/learning_project/data")
}

/// Data location settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
    #[serde(default = "default_cluster_root")]
    pub cluster_root: PathBuf,
    #[serde(default)]
    pub mode: DataMode,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            cluster_root: default_cluster_root(),
            mode: DataMode::default(),
        }
    }
}

impl DataConfig {
    pub fn with_mode(mode: DataMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Resolve the data root, honouring `VGLM_DATA_ROOT`
    pub fn resolve_root(&self) -> PathBuf {
        self.resolve_root_with(std::env::var_os(DATA_ROOT_ENV).map(PathBuf::from))
    }

    fn resolve_root_with(&self, env_override: Option<PathBuf>) -> PathBuf {
        if let Some(root) = env_override.filter(|p| !p.as_os_str().is_empty()) {
            return root;
        }
        match self.mode {
            DataMode::Local => self.local_root.clone(),
            DataMode::Cluster => self.cluster_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exp_filter::{HistoryColumn, Stimulus};
    use crate::filter::FilterValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = DesignConfig::from_json("{}").unwrap();
        assert_eq!(config, DesignConfig::default());
        assert!(config.include_prev_disengaged);
        assert_eq!(config.labels, LabelMode::Multi);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "filter_params": {"prev_violation": 0},
            "include_prev_disengaged": false,
            "labels": "binary",
            "exp_filters": [{"column": "prev_violation", "tau": 3}]
        }"#;

        let config = DesignConfig::from_json(json).unwrap();

        assert!(!config.include_prev_disengaged);
        assert_eq!(config.labels, LabelMode::Binary);
        assert_eq!(
            config.filter_params,
            FilterParams::new().with("prev_violation", FilterValue::Int(0))
        );
        assert_eq!(
            config.exp_filters,
            vec![ExpFilterSpec::new(HistoryColumn::PrevViolation, 3)]
        );
    }

    #[test]
    fn test_unknown_filter_rejected_on_load() {
        let err = DesignConfig::from_json(r#"{"filter_params": {"bogus": 1}}"#).unwrap_err();
        assert!(matches!(
            err,
            DesignError::Configuration(ConfigurationError::UnknownFilterColumn(ref c)) if c == "bogus"
        ));
    }

    #[test]
    fn test_zero_tau_rejected_on_load() {
        let json = r#"{"exp_filters": [{"column": "prev_disengaged", "tau": 0}]}"#;
        assert!(DesignConfig::from_json(json).is_err());
    }

    #[test]
    fn test_huge_tau_config_builds() {
        let json = r#"{"exp_filters": [{"column": "prev_violation", "tau": 1000000000}]}"#;
        let config = DesignConfig::from_json(json).unwrap();

        let out = config.exp_filters[0].apply(&[1.0, 0.0, 0.0], &[1, 1, 1]).unwrap();

        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_interaction_and_binarize_config() {
        let json = r#"{
            "exp_filters": [{"column": "prev_disengaged", "tau": 2, "binarize": true}],
            "stim_interactions": [{"stimulus": "s_b", "tau": 4}]
        }"#;

        let config = DesignConfig::from_json(json).unwrap();

        assert!(config.exp_filters[0].binarize);
        assert_eq!(
            config.stim_interactions,
            vec![StimViolationInteraction::new(Stimulus::SB, 4)]
        );

        let bad = r#"{"stim_interactions": [{"stimulus": "s_a", "tau": 0}]}"#;
        assert!(matches!(
            DesignConfig::from_json(bad),
            Err(DesignError::Configuration(ConfigurationError::InvalidTau(0)))
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = DesignConfig {
            include_prev_disengaged: false,
            ..DesignConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(DesignConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_data_root_resolution() {
        let local = DataConfig::default();
        assert_eq!(local.resolve_root_with(None), PathBuf::from("data"));

        let cluster = DataConfig::with_mode(DataMode::Cluster);
        assert_eq!(
            cluster.resolve_root_with(None),
            PathBuf::from("/Volumes/brody/jbreda/learning_project/data")
        );

        let overridden = cluster.resolve_root_with(Some(PathBuf::from("/tmp/trials")));
        assert_eq!(overridden, PathBuf::from("/tmp/trials"));

        assert_eq!(
            local.resolve_root_with(Some(PathBuf::new())),
            PathBuf::from("data")
        );
    }
}

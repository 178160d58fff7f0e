//! Pipeline orchestration
//!
//! This module provides the public API for violation-glm.
//! It orchestrates the full pipeline from trial records to design payloads.

use crate::adapters::{RecordParser, TrialSource};
use crate::config::DesignConfig;
use crate::design::DesignMatrixGenerator;
use crate::encoder::DesignEncoder;
use crate::error::DesignError;
use crate::features::{partition_by_animal, FeatureDeriver};
use crate::types::{DerivedTrial, DesignMatrix, DesignPayload, TrialRecord};
use tracing::{debug, info};

/// Convert NDJSON trial records to one design payload per animal.
///
/// # Arguments
/// * `ndjson` - Trial records, one JSON object per line
/// * `config_json` - Optional `DesignConfig` JSON; defaults are used when absent
///
/// # Returns
/// Vector of design payload JSON strings, one per animal in order of first appearance
///
/// # Example
/// ```ignore
/// let payloads = trials_to_design_json(
///     trials_ndjson,
///     Some(r#"{"filter_params": {"prev_violation": 0}}"#.to_string()),
/// )?;
/// ```
pub fn trials_to_design_json(
    ndjson: String,
    config_json: Option<String>,
) -> Result<Vec<String>, DesignError> {
    let config = match config_json {
        Some(json) => DesignConfig::from_json(&json)?,
        None => DesignConfig::default(),
    };
    let records = RecordParser::parse_ndjson(&ndjson)?;
    RecordParser::validate_all(&records)?;

    let pipeline = DesignPipeline::new(config);
    pipeline
        .run(records)?
        .iter()
        .map(|design| pipeline.encode_to_json(design))
        .collect()
}

/// Design matrix built for one animal
#[derive(Debug, Clone)]
pub struct AnimalDesign {
    pub animal_id: String,
    pub matrix: DesignMatrix,
}

/// Pipeline from trial records to per-animal design matrices.
///
/// Pipeline stages:
/// 1. FeatureDeriver - Compute history features per animal
/// 2. partition_by_animal - Split the table, preserving trial order
/// 3. DesignMatrixGenerator - Filter rows and assemble the matrix
/// 4. DesignEncoder - Encode to JSON payloads
pub struct DesignPipeline {
    generator: DesignMatrixGenerator,
    encoder: DesignEncoder,
}

impl Default for DesignPipeline {
    fn default() -> Self {
        Self::new(DesignConfig::default())
    }
}

impl DesignPipeline {
    pub fn new(config: DesignConfig) -> Self {
        Self {
            generator: DesignMatrixGenerator::new(config),
            encoder: DesignEncoder::new(),
        }
    }

    pub fn config(&self) -> &DesignConfig {
        self.generator.config()
    }

    /// Derive history features without building matrices
    pub fn derive(&self, records: Vec<TrialRecord>) -> Vec<DerivedTrial> {
        FeatureDeriver::derive(records)
    }

    /// Build one design matrix per animal
    pub fn run(&self, records: Vec<TrialRecord>) -> Result<Vec<AnimalDesign>, DesignError> {
        self.config().validate()?;
        let derived = self.derive(records);
        self.run_derived(derived)
    }

    /// Build one design matrix per animal from already-derived trials
    pub fn run_derived(&self, derived: Vec<DerivedTrial>) -> Result<Vec<AnimalDesign>, DesignError> {
        let mut designs = Vec::new();

        for (animal_id, trials) in partition_by_animal(derived) {
            debug!(animal_id = %animal_id, trials = trials.len(), "evaluating animal");
            let matrix = self.generator.create(&trials)?;
            designs.push(AnimalDesign { animal_id, matrix });
        }

        info!(
            animals = designs.len(),
            rows = designs.iter().map(|d| d.matrix.n_rows()).sum::<usize>(),
            "design matrices generated"
        );
        Ok(designs)
    }

    /// Load trials from a source and build one design matrix per animal
    pub fn run_source(
        &self,
        source: &dyn TrialSource,
        animal_ids: &[String],
        data_type: &str,
    ) -> Result<Vec<AnimalDesign>, DesignError> {
        let records = source.load(animal_ids, data_type)?;
        self.run(records)
    }

    /// Encode a design into a payload
    pub fn encode(&self, design: &AnimalDesign) -> Result<DesignPayload, DesignError> {
        self.encoder.encode(&design.matrix, self.config())
    }

    /// Encode a design to a JSON payload
    pub fn encode_to_json(&self, design: &AnimalDesign) -> Result<String, DesignError> {
        self.encoder.encode_to_json(&design.matrix, self.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySource;
    use crate::config::LabelMode;
    use crate::features::tests::make_trial;

    fn sample_ndjson() -> &'static str {
        r#"{"animal_id": "W078", "session": 1, "trial": 1, "violation": 1, "s_a": 60.0, "s_b": 68.0, "correct_side": 1}
{"animal_id": "W078", "session": 1, "trial": 2, "violation": 0, "s_a": 68.0, "s_b": 60.0, "correct_side": 0, "choice": 0}
{"animal_id": "W080", "session": 1, "trial": 1, "violation": 0, "s_a": 76.0, "s_b": 68.0, "correct_side": 0, "choice": 1}
{"animal_id": "W078", "session": 2, "trial": 1, "violation": 1, "n_prev_trial_not_started": 1, "s_a": 84.0, "s_b": 76.0, "correct_side": 0}"#
    }

    #[test]
    fn test_trials_to_design_json() {
        let payloads = trials_to_design_json(sample_ndjson().to_string(), None).unwrap();

        assert_eq!(payloads.len(), 2);
        let first: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(first["animal_id"], "W078");
        assert_eq!(first["n_trials"], 3);
        assert_eq!(first["labels"], serde_json::json!([2, 0, 2]));

        let second: serde_json::Value = serde_json::from_str(&payloads[1]).unwrap();
        assert_eq!(second["animal_id"], "W080");
        assert_eq!(second["n_trials"], 1);
    }

    #[test]
    fn test_trials_to_design_json_with_filter() {
        let config = r#"{"filter_params": {"prev_violation": 0}}"#.to_string();

        let payloads = trials_to_design_json(sample_ndjson().to_string(), Some(config)).unwrap();

        let first: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        // W078 trial 2 follows a violation in the same session
        assert_eq!(first["n_trials"], 2);
        assert_eq!(first["trial_keys"][0]["trial"], 1);
        assert_eq!(first["trial_keys"][1]["session"], 2);
    }

    #[test]
    fn test_unknown_filter_column_is_reported() {
        let config = r#"{"filter_params": {"reaction_time": 0}}"#.to_string();

        let err = trials_to_design_json(sample_ndjson().to_string(), Some(config)).unwrap_err();

        assert!(matches!(err, DesignError::Configuration(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(trials_to_design_json("not valid json".to_string(), None).is_err());
    }

    #[test]
    fn test_empty_input() {
        let payloads = trials_to_design_json(String::new(), None).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_run_source() {
        let source = MemorySource::new(vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 1, 2, 1),
        ]);
        let pipeline = DesignPipeline::new(DesignConfig {
            labels: LabelMode::Binary,
            ..DesignConfig::default()
        });

        let designs = pipeline
            .run_source(&source, &["W078".to_string()], "violation")
            .unwrap();

        assert_eq!(designs.len(), 1);
        assert_eq!(designs[0].animal_id, "W078");
        // the violation trial is dropped in binary mode
        assert_eq!(designs[0].matrix.n_rows(), 1);
    }

    #[test]
    fn test_lag_features_computed_before_partitioning() {
        let records = vec![
            make_trial("W078", 1, 1, 1),
            make_trial("W080", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
        ];

        let designs = DesignPipeline::default().run(records).unwrap();

        let w078 = &designs[0].matrix;
        let disengaged = w078.column("prev_disengaged").unwrap().to_vec();
        assert_eq!(disengaged, vec![0.0, 1.0]);
    }
}

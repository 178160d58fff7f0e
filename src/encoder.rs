//! Design payload encoding
//!
//! This module encodes design matrices into JSON payloads for downstream
//! model fitting. Each payload records who produced it and with which
//! filtering and feature-set options.

use crate::config::DesignConfig;
use crate::error::DesignError;
use crate::types::{DesignMatrix, DesignPayload, DesignProducer};
use crate::{PRODUCER_NAME, VGLM_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current design payload format version
pub const DESIGN_FORMAT_VERSION: &str = "1.0.0";

/// Encoder for producing design payloads
pub struct DesignEncoder {
    instance_id: String,
}

impl Default for DesignEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a design matrix and the configuration that produced it
    pub fn encode(
        &self,
        matrix: &DesignMatrix,
        config: &DesignConfig,
    ) -> Result<DesignPayload, DesignError> {
        let producer = DesignProducer {
            name: PRODUCER_NAME.to_string(),
            version: VGLM_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let rows = matrix
            .values
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        Ok(DesignPayload {
            format_version: DESIGN_FORMAT_VERSION.to_string(),
            producer,
            generated_at_utc: Utc::now().to_rfc3339(),
            animal_id: matrix.animal_id.clone(),
            n_trials: matrix.n_rows(),
            columns: matrix.columns.clone(),
            rows,
            labels: matrix.labels.clone(),
            label_mode: config.labels.as_str().to_string(),
            trial_keys: matrix.trial_keys.clone(),
            filter_params: serde_json::to_value(&config.filter_params)?,
            include_prev_disengaged: config.include_prev_disengaged,
        })
    }

    /// Encode to a compact JSON string
    pub fn encode_to_json(
        &self,
        matrix: &DesignMatrix,
        config: &DesignConfig,
    ) -> Result<String, DesignError> {
        let payload = self.encode(matrix, config)?;
        serde_json::to_string(&payload).map_err(DesignError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignMatrixGenerator;
    use crate::features::tests::make_trial;
    use crate::features::FeatureDeriver;
    use crate::filter::{FilterParams, FilterValue};

    #[test]
    fn test_encode_payload() {
        let config = DesignConfig {
            filter_params: FilterParams::new().with("prev_violation", FilterValue::Int(0)),
            ..DesignConfig::default()
        };
        let trials = FeatureDeriver::derive(vec![
            make_trial("W078", 1, 1, 0),
            make_trial("W078", 1, 2, 0),
        ]);
        let matrix = DesignMatrixGenerator::new(config.clone()).create(&trials).unwrap();
        let encoder = DesignEncoder::with_instance_id("test-instance".to_string());

        let json = encoder.encode_to_json(&matrix, &config).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["format_version"], DESIGN_FORMAT_VERSION);
        assert_eq!(payload["producer"]["name"], PRODUCER_NAME);
        assert_eq!(payload["producer"]["instance_id"], "test-instance");
        assert_eq!(payload["animal_id"], "W078");
        assert_eq!(payload["n_trials"], 2);
        assert_eq!(payload["columns"][0], "bias");
        assert_eq!(payload["rows"].as_array().unwrap().len(), 2);
        assert_eq!(payload["rows"][0].as_array().unwrap().len(), 7);
        assert_eq!(payload["labels"], serde_json::json!([1, 0]));
        assert_eq!(payload["label_mode"], "multi");
        assert_eq!(payload["filter_params"]["prev_violation"], 0);
        assert_eq!(payload["trial_keys"][1]["trial"], 2);
        assert_eq!(payload["include_prev_disengaged"], true);
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(DesignEncoder::new().instance_id(), DesignEncoder::new().instance_id());
    }
}

//! violation-glm - Trial history features and design matrices for violation GLMs
//!
//! Turns behavioral trial tables into model-ready inputs through a
//! deterministic pipeline: trial source → history feature derivation →
//! row filtering → design-matrix assembly → JSON encoding.
//!
//! ## Modules
//!
//! - **Features**: per-animal lag features that reset at session boundaries
//! - **Design**: filtered design matrices with aligned labels

pub mod adapters;
pub mod config;
pub mod design;
pub mod encoder;
pub mod error;
pub mod exp_filter;
pub mod features;
pub mod filter;
pub mod normalizer;
pub mod pipeline;
pub mod summary;
pub mod types;

pub use config::{DataConfig, DataMode, DesignConfig, LabelMode};
pub use design::DesignMatrixGenerator;
pub use error::{ConfigurationError, DesignError, RecordError};
pub use features::FeatureDeriver;
pub use filter::{FilterParams, FilterValue};
pub use pipeline::{trials_to_design_json, AnimalDesign, DesignPipeline};
pub use types::{DerivedTrial, DesignMatrix, LagFeatures, TrialRecord};

/// Crate version embedded in all design payloads
pub const VGLM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for design payloads
pub const PRODUCER_NAME: &str = "violation-glm";

//! Pipeline definition files.
//!
//! This module handles YAML pipeline files:
//! - Schema definitions in [`schema`]
//! - Loading in [`loader`]
//! - Validation in [`validator`]
//! - Conversion to a runnable [`Pipeline`](crate::pipeline::Pipeline) via
//!   [`PipelineConfig::into_pipeline`]
//!
//! # Example
//!
//! ```
//! use stagehand::config::{load_pipeline_file, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("pipeline.yml");
//! fs::write(&path, "steps:\n  - name: update\n    command: apt-get update\n").unwrap();
//!
//! let config = load_pipeline_file(&path).unwrap();
//! validate(&config).unwrap();
//! let pipeline = config.into_pipeline().unwrap();
//! assert_eq!(pipeline.len(), 1);
//! ```

pub mod convert;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{load_pipeline_file, parse_pipeline};
pub use schema::{
    CommandConfig, PercentTriggersConfig, PhaseRuleConfig, PipelineConfig, Settings, StepConfig,
    ANY_TRIGGER,
};
pub use validator::{validate, validate_config, ValidationError};

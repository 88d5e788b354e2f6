//! Error types for Stagehand operations.
//!
//! This module defines [`StagehandError`], the error type for structural
//! problems (bad command specs, unreadable or invalid pipeline files), and a
//! [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A command that fails to start, times out or exits non-zero is *not* an
//!   error: it is a [`CommandOutcome`](crate::shell::CommandOutcome) value.
//! - A required step failing is *not* an error: it is a
//!   [`PipelineResult`](crate::pipeline::PipelineResult) with `success == false`.
//! - `StagehandError` is reserved for input that cannot be run at all.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Stagehand operations.
#[derive(Debug, Error)]
pub enum StagehandError {
    /// A command spec could not be constructed.
    #[error("Invalid command: {message}")]
    InvalidCommand { message: String },

    /// A pipeline is structurally unusable (no steps, duplicate names).
    #[error("Invalid pipeline: {message}")]
    InvalidPipeline { message: String },

    /// Pipeline definition file not found at expected location.
    #[error("Pipeline file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a pipeline definition.
    #[error("Failed to parse pipeline at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid pipeline definition structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Stagehand operations.
pub type Result<T> = std::result::Result<T, StagehandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_command_displays_message() {
        let err = StagehandError::InvalidCommand {
            message: "argument vector is empty".into(),
        };
        assert!(err.to_string().contains("argument vector is empty"));
    }

    #[test]
    fn invalid_pipeline_displays_message() {
        let err = StagehandError::InvalidPipeline {
            message: "duplicate step name 'update'".into(),
        };
        assert!(err.to_string().contains("duplicate step name"));
    }

    #[test]
    fn config_not_found_displays_path() {
        let err = StagehandError::ConfigNotFound {
            path: PathBuf::from("/etc/install.yml"),
        };
        assert!(err.to_string().contains("/etc/install.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = StagehandError::ConfigParseError {
            path: PathBuf::from("/install.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/install.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StagehandError = io_err.into();
        assert!(matches!(err, StagehandError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(StagehandError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}

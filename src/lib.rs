//! Stagehand - run installer steps as one operation with live progress.
//!
//! Stagehand runs external commands (package managers, system tools) with
//! timeouts, parses their output for progress as it streams, and chains
//! them into pipelines with fail-fast semantics and a single overall
//! progress display.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Pipeline file loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - Sequential step orchestration
//! - [`progress`] - Live progress parsing of command output
//! - [`shell`] - Command execution with timeouts
//! - [`ui`] - Progress sinks, sessions, and result rendering
//!
//! # Example
//!
//! ```
//! use stagehand::progress::ProgressTracker;
//!
//! let mut tracker = ProgressTracker::default();
//! let event = tracker.observe("Unpacking meshd (2.5.0) ... 55%").unwrap();
//! assert_eq!(event.percent, Some(55));
//! assert_eq!(event.label.as_deref(), Some("Unpacking packages…"));
//! ```
//!
//! For running commands and pipelines, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod shell;
pub mod ui;

pub use error::{Result, StagehandError};

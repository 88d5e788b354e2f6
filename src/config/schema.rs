//! Pipeline file schema.
//!
//! This module contains the struct definitions that map to the YAML
//! pipeline file format:
//!
//! ```yaml
//! name: Installing meshd
//! settings:
//!   default_timeout: 900
//!   output: normal
//! steps:
//!   - name: update
//!     command: apt-get update
//!   - name: install
//!     command: [apt-get, install, -y, meshd]
//!     live: true
//!   - name: cleanup
//!     command: apt-get clean && rm -rf /var/lib/apt/lists/*
//!     shell: true
//!     optional: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ui::OutputMode;

/// Root of a pipeline file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Label for the overall progress display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Global settings
    pub settings: Settings,

    /// Steps, in execution order
    pub steps: Vec<StepConfig>,

    /// Phase rules for live steps; replaces the built-in apt rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_rules: Option<Vec<PhaseRuleConfig>>,

    /// Which lines may carry a percentage: a list of substrings, or `any`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_triggers: Option<PercentTriggersConfig>,
}

/// Settings that apply to every step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Timeout in seconds for steps that set none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout: Option<u64>,

    /// Output mode unless overridden on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
}

/// One step of a pipeline file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepConfig {
    /// Unique step name
    pub name: String,

    /// Command line or argument list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandConfig>,

    /// Run `command` through the system shell
    #[serde(skip_serializing_if = "is_false")]
    pub shell: bool,

    /// Record a failure and continue
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,

    /// Parse output for live progress
    #[serde(skip_serializing_if = "is_false")]
    pub live: bool,

    /// Timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// A step command as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// `command: apt-get update`
    Line(String),
    /// `command: [apt-get, update]`
    Argv(Vec<String>),
}

/// A phase rule as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseRuleConfig {
    /// Substring to look for
    pub contains: String,
    /// Label shown while matching lines arrive
    pub label: String,
}

/// `percent_triggers: any` or `percent_triggers: [..]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentTriggersConfig {
    Keyword(String),
    List(Vec<String>),
}

/// Keyword accepting a percentage on every line.
pub const ANY_TRIGGER: &str = "any";

fn is_false(v: &bool) -> bool {
    !v
}

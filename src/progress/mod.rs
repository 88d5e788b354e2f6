//! Live progress parsing.
//!
//! Commands such as `apt-get` print lines like `Unpacking foo ... 55%`.
//! [`ProgressTracker`] turns such lines into [`ProgressEvent`]s using
//! [`PhaseRules`] for the phase label and a percentage extracted from
//! trigger lines; [`run_with_live_progress`] wires a tracker between a
//! running command and a progress display.

pub mod live;
pub mod rules;
pub mod tracker;

pub use live::{run_with_live_progress, run_with_spinner};
pub use rules::{extract_percent, PercentTriggers, PhaseRule, PhaseRules, PROGRESS_TRIGGER};
pub use tracker::{ProgressEvent, ProgressTracker};

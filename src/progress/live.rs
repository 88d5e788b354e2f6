//! Single commands wrapped in a progress display.

use crate::shell::{CommandOutcome, CommandRunner, CommandSpec};
use crate::ui::{ProgressSession, ProgressSink};

use super::tracker::ProgressTracker;

/// Run `spec` with combined output, moving a 0..=100 display as progress
/// lines arrive.
///
/// The display is started under `description`, relabelled whenever the
/// tracker detects a new phase, pushed to 100 when the stream closes, and
/// always stopped before returning, whatever the outcome.
pub fn run_with_live_progress(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    description: &str,
    sink: &mut dyn ProgressSink,
    mut tracker: ProgressTracker,
) -> CommandOutcome {
    let mut session = ProgressSession::begin(sink, description, Some(100));
    tracing::debug!(command = %spec, "running with live progress");

    let outcome = runner.run_live(spec, &mut |line: &str| {
        if let Some(event) = tracker.observe(line) {
            tracing::trace!(percent = ?event.percent, label = ?event.label, "progress");
            session.apply(&event);
        }
    });

    if let Some(event) = tracker.finish() {
        session.apply(&event);
    }
    session.finish();
    outcome
}

/// Run `spec` to completion behind an indeterminate indicator.
pub fn run_with_spinner(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    description: &str,
    sink: &mut dyn ProgressSink,
) -> CommandOutcome {
    let session = ProgressSession::begin(sink, description, None);
    let outcome = runner.run(spec);
    session.finish();
    outcome
}

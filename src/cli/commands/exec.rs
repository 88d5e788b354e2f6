//! Exec command implementation.
//!
//! The `stagehand exec` command runs one command behind a progress
//! indicator: a spinner by default, or a percentage bar driven by the
//! command's own output with `--live`.

use std::io::Write;
use std::time::Duration;

use crate::cli::args::ExecArgs;
use crate::error::Result;
use crate::progress::{run_with_live_progress, run_with_spinner, ProgressTracker};
use crate::shell::{CommandOutcome, CommandSpec, SystemRunner};
use crate::ui::excerpt;

use super::dispatcher::{Command, CommandResult, Context};
use super::run::FAILURE_EXCERPT_CHARS;

/// The exec command implementation.
pub struct ExecCommand {
    args: ExecArgs,
}

impl ExecCommand {
    /// Create a new exec command.
    pub fn new(args: ExecArgs) -> Self {
        Self { args }
    }

    /// Build the command spec described by the arguments.
    pub fn spec(&self) -> Result<CommandSpec> {
        let spec = if self.args.shell {
            CommandSpec::shell(self.args.command.join(" "))?
        } else {
            CommandSpec::argv(&self.args.command)?
        };
        match self.args.timeout {
            Some(secs) => spec.with_timeout(Duration::from_secs(secs)),
            None => Ok(spec),
        }
    }

    fn forward_output(&self, outcome: &CommandOutcome) {
        if !outcome.stdout().is_empty() {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(outcome.stdout().as_bytes()).ok();
            stdout.flush().ok();
        }
        if !outcome.stderr().is_empty() {
            let mut stderr = std::io::stderr().lock();
            stderr.write_all(outcome.stderr().as_bytes()).ok();
            stderr.flush().ok();
        }
    }
}

impl Command for ExecCommand {
    fn execute(&self, ctx: &Context) -> Result<CommandResult> {
        let spec = self.spec()?;
        let mode = ctx.output_mode(None);
        let label = self.args.label.clone().unwrap_or_else(|| spec.to_string());

        let mut sink = ctx.sink(mode);
        let outcome = if self.args.live {
            run_with_live_progress(
                &SystemRunner,
                &spec,
                &label,
                sink.as_mut(),
                ProgressTracker::default(),
            )
        } else {
            run_with_spinner(&SystemRunner, &spec, &label, sink.as_mut())
        };
        drop(sink);

        // Live output was already consumed as progress; show it again only
        // when asked to.
        if mode.shows_command_output() || (!self.args.live && mode.shows_detail()) {
            self.forward_output(&outcome);
        }

        match outcome.failure() {
            None => {
                if mode.shows_status() {
                    println!("{}", ctx.theme.format_success(&label));
                }
                Ok(CommandResult::success())
            }
            Some(failure) => {
                eprintln!("{}", ctx.theme.format_error(&format!("{} {}", label, failure)));
                if self.args.live && !mode.shows_command_output() {
                    let evidence = excerpt(outcome.stdout(), FAILURE_EXCERPT_CHARS);
                    if !evidence.is_empty() {
                        eprintln!("  {}", ctx.theme.dim.apply_to(evidence));
                    }
                }
                Ok(CommandResult::failure(1))
            }
        }
    }
}

//! Run command implementation.
//!
//! The `stagehand run` command executes the steps of a pipeline file.

use serde::Serialize;

use crate::cli::args::RunArgs;
use crate::config::load_pipeline_file;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineResult, StepDescriptor};
use crate::shell::{is_elevated, SystemRunner};
use crate::ui::{excerpt, render_summary, HiddenSink, OutputMode, ProgressSink, StagehandTheme};

use super::dispatcher::{Command, CommandResult, Context};

/// Characters of a failing step's output shown in the failure report.
pub const FAILURE_EXCERPT_CHARS: usize = 200;

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn dry_run(&self, pipeline: &Pipeline, mode: OutputMode) -> Result<CommandResult> {
        if self.args.json {
            let plan: Vec<PlannedStep<'_>> =
                pipeline.steps().iter().map(PlannedStep::from).collect();
            println!("{}", to_json(&plan)?);
        } else if mode.shows_status() {
            println!("Dry run: no commands will be executed");
            print!("{}", render_plan(pipeline));
        }
        Ok(CommandResult::success())
    }

    fn report(&self, result: &PipelineResult, ctx: &Context, mode: OutputMode) -> Result<()> {
        if self.args.json {
            println!("{}", to_json(result)?);
        } else {
            if mode.shows_command_output() {
                print!("{}", render_step_output(result));
            }
            if mode.shows_status() {
                println!("{}", render_summary(result, &ctx.theme));
            }
        }

        if let Some(report) = failure_report(result, &ctx.theme) {
            eprintln!("{}", report);
        }
        Ok(())
    }
}

impl Command for RunCommand {
    fn execute(&self, ctx: &Context) -> Result<CommandResult> {
        let config = load_pipeline_file(&self.args.file)?;
        let mode = ctx.output_mode(config.settings.output);
        let pipeline = config.into_pipeline()?;

        tracing::debug!(
            file = %self.args.file.display(),
            steps = pipeline.len(),
            ?mode,
            elevated = is_elevated(),
            "pipeline loaded"
        );

        if self.args.dry_run {
            return self.dry_run(&pipeline, mode);
        }

        let mut sink: Box<dyn ProgressSink> = if self.args.json {
            Box::new(HiddenSink)
        } else {
            ctx.sink(mode)
        };
        let result = pipeline.run(&SystemRunner, sink.as_mut());
        drop(sink);

        self.report(&result, ctx, mode)?;

        if result.success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

/// One step as shown by `--dry-run --json`.
#[derive(Debug, Serialize)]
pub struct PlannedStep<'a> {
    pub name: &'a str,
    pub command: String,
    pub shell: bool,
    pub optional: bool,
    pub live: bool,
    pub timeout_secs: u64,
}

impl<'a> From<&'a StepDescriptor> for PlannedStep<'a> {
    fn from(step: &'a StepDescriptor) -> Self {
        Self {
            name: &step.name,
            command: step.command.to_string(),
            shell: step.command.is_shell(),
            optional: step.optional,
            live: step.is_live(),
            timeout_secs: step.command.timeout().as_secs(),
        }
    }
}

/// Numbered list of the steps a pipeline would run.
pub fn render_plan(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    for (index, step) in pipeline.steps().iter().enumerate() {
        let mut flags = Vec::new();
        if step.optional {
            flags.push("optional".to_string());
        }
        if step.is_live() {
            flags.push("live".to_string());
        }
        flags.push(format!("timeout {}s", step.command.timeout().as_secs()));

        out.push_str(&format!(
            "  {}. {}: {} [{}]\n",
            index + 1,
            step.name,
            step.command,
            flags.join(", ")
        ));
    }
    out
}

/// Why the pipeline stopped, with the tail of evidence a user needs.
///
/// Uses stderr when the step wrote any, else stdout (live steps fold
/// everything into stdout). Returns `None` for a successful run.
pub fn failure_report(result: &PipelineResult, theme: &StagehandTheme) -> Option<String> {
    let step = result.failed_result()?;
    let Some(outcome) = &step.outcome else {
        return Some(theme.format_error(&format!(
            "Step '{}' did not start: the run was cancelled",
            step.name
        )));
    };

    let reason = outcome
        .failure()
        .map(ToString::to_string)
        .unwrap_or_else(|| "failed".to_string());
    let mut report = theme.format_error(&format!("Step '{}' {}", step.name, reason));

    let evidence = if outcome.stderr().trim().is_empty() {
        outcome.stdout()
    } else {
        outcome.stderr()
    };
    let evidence = excerpt(evidence, FAILURE_EXCERPT_CHARS);
    if !evidence.is_empty() {
        report.push('\n');
        report.push_str(&format!("  {}", theme.dim.apply_to(evidence)));
    }
    Some(report)
}

/// Captured output of every step that produced any.
fn render_step_output(result: &PipelineResult) -> String {
    let mut out = String::new();
    for step in result.steps() {
        let Some(outcome) = &step.outcome else {
            continue;
        };
        for (stream, text) in [("stdout", outcome.stdout()), ("stderr", outcome.stderr())] {
            if text.trim().is_empty() {
                continue;
            }
            out.push_str(&format!("── {} ({}) ──\n", step.name, stream));
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| anyhow::Error::new(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{CommandOutcome, CommandRunner, CommandSpec};
    use std::time::Duration;

    struct FixedRunner {
        code: i32,
        stdout: String,
        stderr: String,
    }

    impl FixedRunner {
        fn new(code: i32, stdout: &str, stderr: &str) -> Self {
            Self {
                code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }
        }
    }

    impl CommandRunner for FixedRunner {
        fn run(&self, _spec: &CommandSpec) -> CommandOutcome {
            CommandOutcome::exited(
                self.code,
                self.stdout.clone(),
                self.stderr.clone(),
                Duration::ZERO,
            )
        }

        fn run_live(&self, spec: &CommandSpec, _: &mut dyn FnMut(&str)) -> CommandOutcome {
            self.run(spec)
        }
    }

    fn pipeline() -> Pipeline {
        let configure = CommandSpec::parse("dpkg --configure -a", false).unwrap();
        let cleanup = CommandSpec::shell("apt-get clean").unwrap();
        Pipeline::new(vec![
            StepDescriptor::required("configure", configure),
            StepDescriptor::optional("cleanup", cleanup).live(),
        ])
        .unwrap()
    }

    #[test]
    fn failure_report_prefers_stderr() {
        let runner = FixedRunner::new(1, "some stdout", "E: dpkg was interrupted");
        let result = pipeline().run(&runner, &mut HiddenSink);
        let report = failure_report(&result, &StagehandTheme::plain()).unwrap();

        assert!(report.contains("Step 'configure' exited with code 1"));
        assert!(report.contains("E: dpkg was interrupted"));
        assert!(!report.contains("some stdout"));
    }

    #[test]
    fn failure_report_falls_back_to_stdout() {
        let runner = FixedRunner::new(100, "E: Unable to locate package meshd", "");
        let result = pipeline().run(&runner, &mut HiddenSink);
        let report = failure_report(&result, &StagehandTheme::plain()).unwrap();
        assert!(report.contains("Unable to locate package meshd"));
    }

    #[test]
    fn failure_report_truncates_long_output() {
        let runner = FixedRunner::new(1, "", &"x".repeat(500));
        let result = pipeline().run(&runner, &mut HiddenSink);
        let report = failure_report(&result, &StagehandTheme::plain()).unwrap();
        assert!(report.contains(&format!("{}...", "x".repeat(FAILURE_EXCERPT_CHARS))));
        assert!(!report.contains(&"x".repeat(FAILURE_EXCERPT_CHARS + 1)));
    }

    #[test]
    fn no_report_for_success() {
        let runner = FixedRunner::new(0, "", "");
        let result = pipeline().run(&runner, &mut HiddenSink);
        assert!(failure_report(&result, &StagehandTheme::plain()).is_none());
    }

    #[test]
    fn plan_lists_every_step() {
        let plan = render_plan(&pipeline());
        assert_eq!(
            plan,
            "  1. configure: dpkg --configure -a [timeout 600s]\n  \
             2. cleanup: apt-get clean [optional, live, timeout 600s]\n"
        );
    }

    #[test]
    fn planned_step_json() {
        let pipeline = pipeline();
        let planned = PlannedStep::from(&pipeline.steps()[1]);
        let json = serde_json::to_value(&planned).unwrap();
        assert_eq!(json["name"], "cleanup");
        assert_eq!(json["shell"], true);
        assert_eq!(json["live"], true);
        assert_eq!(json["timeout_secs"], 600);
    }

    #[test]
    fn step_output_is_grouped_by_step() {
        let runner = FixedRunner::new(0, "Reading package lists...", "");
        let result = pipeline().run(&runner, &mut HiddenSink);
        let out = render_step_output(&result);
        assert!(out.contains("── configure (stdout) ──\nReading package lists...\n"));
        assert!(!out.contains("(stderr)"));
    }
}

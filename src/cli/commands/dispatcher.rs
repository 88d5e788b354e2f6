//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`Context`] for what every command shares (output mode, colours, sinks)
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::{create_sink, OutputMode, ProgressSink, StagehandTheme};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ctx: &Context) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output mode forced by `--verbose` / `--quiet`.
    pub mode_override: Option<OutputMode>,
    /// Whether progress may be drawn as a redrawing bar.
    pub interactive: bool,
    /// Styling for status lines.
    pub theme: StagehandTheme,
}

impl Context {
    /// The effective output mode, given the one a pipeline file asks for.
    pub fn output_mode(&self, configured: Option<OutputMode>) -> OutputMode {
        self.mode_override.or(configured).unwrap_or_default()
    }

    /// A progress sink suited to this terminal and `mode`.
    pub fn sink(&self, mode: OutputMode) -> Box<dyn ProgressSink> {
        create_sink(self.interactive, mode)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    ctx: Context,
}

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => super::run::RunCommand::new(args.clone()).execute(&self.ctx),
            Commands::Exec(args) => super::exec::ExecCommand::new(args.clone()).execute(&self.ctx),
            Commands::Validate(args) => {
                super::validate::ValidateCommand::new(args.clone()).execute(&self.ctx)
            }
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(&self.ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(mode_override: Option<OutputMode>) -> Context {
        Context {
            mode_override,
            interactive: false,
            theme: StagehandTheme::plain(),
        }
    }

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn flag_overrides_configured_mode() {
        let ctx = ctx(Some(OutputMode::Quiet));
        assert_eq!(ctx.output_mode(Some(OutputMode::Verbose)), OutputMode::Quiet);
    }

    #[test]
    fn configured_mode_applies_without_flag() {
        let ctx = ctx(None);
        assert_eq!(ctx.output_mode(Some(OutputMode::Silent)), OutputMode::Silent);
        assert_eq!(ctx.output_mode(None), OutputMode::Normal);
    }
}

//! Validate command implementation.
//!
//! The `stagehand validate` command checks a pipeline file without running
//! anything.

use crate::cli::args::ValidateArgs;
use crate::config::{load_pipeline_file, validate_config, ValidationError};
use crate::error::Result;

use super::dispatcher::{Command, CommandResult, Context};

/// Exit code for a file that parses but fails validation.
pub const INVALID_EXIT_CODE: i32 = 2;

/// The validate command implementation.
pub struct ValidateCommand {
    args: ValidateArgs,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(args: ValidateArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ValidateArgs {
        &self.args
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ctx: &Context) -> Result<CommandResult> {
        let config = load_pipeline_file(&self.args.file)?;
        let errors = validate_config(&config);
        let mode = ctx.output_mode(config.settings.output);

        if errors.is_empty() {
            if mode.shows_status() {
                let msg = format!(
                    "{} is valid ({} steps)",
                    self.args.file.display(),
                    config.steps.len()
                );
                println!("{}", ctx.theme.format_success(&msg));
            }
            return Ok(CommandResult::success());
        }

        for error in &errors {
            eprintln!("{}", ctx.theme.format_error(&describe(error)));
        }
        eprintln!(
            "{} problem{} found in {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            self.args.file.display()
        );
        Ok(CommandResult::failure(INVALID_EXIT_CODE))
    }
}

fn describe(error: &ValidationError) -> String {
    format!("[{}] {}", error.rule, error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_rule() {
        let error = ValidationError {
            rule: "no-steps".to_string(),
            message: "Pipeline must define at least one step".to_string(),
            step: None,
        };
        assert_eq!(
            describe(&error),
            "[no-steps] Pipeline must define at least one step"
        );
    }
}

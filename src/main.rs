//! Stagehand CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use console::Term;
use stagehand::cli::{Cli, CommandDispatcher, Context};
use stagehand::shell::is_ci;
use stagehand::ui::StagehandTheme;
use stagehand::StagehandError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so they never interleave with progress on stdout.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("stagehand=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stagehand=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Exit code for an error that stopped a command before it produced a result.
fn error_exit_code(err: &StagehandError) -> u8 {
    match err {
        StagehandError::InvalidCommand { .. }
        | StagehandError::InvalidPipeline { .. }
        | StagehandError::ConfigNotFound { .. }
        | StagehandError::ConfigParseError { .. }
        | StagehandError::ConfigValidationError { .. } => 2,
        StagehandError::Io(_) | StagehandError::Other(_) => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("Stagehand starting with args: {:?}", cli);

    // Handle --no-color
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let theme = if cli.no_color {
        StagehandTheme::plain()
    } else {
        StagehandTheme::detect()
    };

    let ctx = Context {
        mode_override: cli.output_mode(),
        interactive: !is_ci() && Term::stderr().is_term(),
        theme,
    };

    let dispatcher = CommandDispatcher::new(ctx);
    match dispatcher.dispatch(&cli) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!(
                "{}",
                dispatcher.context().theme.format_error(&format!("Error: {}", e))
            );
            ExitCode::from(error_exit_code(&e))
        }
    }
}

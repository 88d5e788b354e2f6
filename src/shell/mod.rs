//! External command execution.
//!
//! - [`CommandSpec`] - a validated, immutable invocation with its timeout
//! - [`run`] / [`run_streaming`] - execute one spec to completion or timeout
//! - [`CommandOutcome`] - the tagged result record of one execution
//! - [`CommandRunner`] - the trait the pipeline drives, with [`SystemRunner`]
//!   as the real implementation
//!
//! Nothing else in the crate talks to the operating system's process APIs.

pub mod command;
pub mod outcome;
pub mod platform;
pub mod runner;

pub use command::{CommandSpec, Invocation, DEFAULT_TIMEOUT, MAX_TIMEOUT};
pub use outcome::{CommandOutcome, CommandStatus, Failure, SENTINEL_EXIT_CODE};
pub use platform::{is_ci, is_elevated, shell_program};
pub use runner::{run, run_streaming, CommandRunner, OutputLine, StreamMode, SystemRunner};

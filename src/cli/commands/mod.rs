//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations with a shared [`Context`]
//! (output mode, colours and progress sink selection).

pub mod completions;
pub mod dispatcher;
pub mod exec;
pub mod run;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, Context};

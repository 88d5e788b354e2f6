//! Step pipelines.
//!
//! A [`Pipeline`] runs an ordered list of [`StepDescriptor`]s one at a
//! time through a [`CommandRunner`](crate::shell::CommandRunner),
//! reporting overall progress to a [`ProgressSink`](crate::ui::ProgressSink).
//!
//! # Example
//!
//! ```no_run
//! use stagehand::pipeline::{Pipeline, StepDescriptor};
//! use stagehand::shell::{CommandSpec, SystemRunner};
//! use stagehand::ui::HiddenSink;
//!
//! # fn main() -> stagehand::Result<()> {
//! let pipeline = Pipeline::new(vec![
//!     StepDescriptor::required("update", CommandSpec::parse("apt-get update", false)?),
//!     StepDescriptor::optional("cleanup", CommandSpec::parse("apt-get clean", false)?),
//! ])?;
//!
//! let result = pipeline.run(&SystemRunner, &mut HiddenSink);
//! if let Some(name) = result.failed_step() {
//!     eprintln!("{} failed", name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod result;
pub mod step;

pub use orchestrator::{CancelToken, Pipeline, DEFAULT_LABEL};
pub use result::PipelineResult;
pub use step::{StepDescriptor, StepMode, StepResult, StepStatus};

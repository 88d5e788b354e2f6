//! Progress display.
//!
//! This module provides:
//! - [`ProgressSink`] trait, the only thing the engine knows about displays
//! - [`ProgressSession`], a guard that guarantees a sink is stopped
//! - [`BarSink`] for interactive terminals, [`PlainSink`] for CI/headless
//!   output, [`HiddenSink`] and [`MockSink`] for silence and tests
//! - [`report`] helpers for rendering results after a run
//!
//! # Example
//!
//! ```
//! use stagehand::ui::{MockSink, ProgressSession};
//!
//! let mut sink = MockSink::new();
//! {
//!     let mut session = ProgressSession::begin(&mut sink, "Installing", Some(2));
//!     session.advance(Some("update"));
//!     session.advance(Some("configure"));
//! }
//! assert_eq!(sink.positions(), vec![1, 2]);
//! assert!(sink.is_stopped());
//! ```

pub mod bar;
pub mod mock;
pub mod output;
pub mod plain;
pub mod report;
pub mod session;
pub mod theme;

pub use bar::BarSink;
pub use mock::{MockSink, SinkCall};
pub use output::OutputMode;
pub use plain::PlainSink;
pub use report::{excerpt, format_duration, render_summary};
pub use session::ProgressSession;
pub use theme::{should_use_colors, StagehandTheme};

use crate::progress::ProgressEvent;

/// Receives progress from the engine. Owns all rendering.
pub trait ProgressSink {
    /// Acquire the display. `total` is `None` for an indeterminate spinner.
    fn start(&mut self, label: &str, total: Option<u64>);

    /// Move to `position` (if given) and/or replace the label (if given).
    fn update(&mut self, position: Option<u64>, label: Option<&str>);

    /// Live progress of the unit currently running inside a multi-step
    /// display. Does not change the position.
    fn detail(&mut self, _event: &ProgressEvent) {}

    /// Release the display.
    fn stop(&mut self);
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn start(&mut self, label: &str, total: Option<u64>) {
        (**self).start(label, total)
    }

    fn update(&mut self, position: Option<u64>, label: Option<&str>) {
        (**self).update(position, label)
    }

    fn detail(&mut self, event: &ProgressEvent) {
        (**self).detail(event)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// A sink that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenSink;

impl ProgressSink for HiddenSink {
    fn start(&mut self, _label: &str, _total: Option<u64>) {}

    fn update(&mut self, _position: Option<u64>, _label: Option<&str>) {}

    fn stop(&mut self) {}
}

/// Pick a sink for the current environment.
pub fn create_sink(interactive: bool, mode: OutputMode) -> Box<dyn ProgressSink> {
    if !mode.shows_progress() {
        Box::new(HiddenSink)
    } else if interactive {
        Box::new(BarSink::new(mode))
    } else {
        Box::new(PlainSink::stdout(mode))
    }
}

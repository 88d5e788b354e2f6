//! Terminal progress bars.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::progress::ProgressEvent;

use super::{OutputMode, ProgressSink};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Renders progress with `indicatif`: a spinner when the total is unknown,
/// a bar with position and elapsed time otherwise.
pub struct BarSink {
    bar: Option<ProgressBar>,
    label: String,
    mode: OutputMode,
    hidden: bool,
}

impl BarSink {
    /// Create a sink that draws to the terminal.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            bar: None,
            label: String::new(),
            mode,
            hidden: false,
        }
    }

    /// Create a sink whose bars are never drawn.
    pub fn hidden() -> Self {
        Self {
            bar: None,
            label: String::new(),
            mode: OutputMode::Quiet,
            hidden: true,
        }
    }

    /// A clone of the current bar, if started.
    pub fn progress_bar(&self) -> Option<ProgressBar> {
        self.bar.clone()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .tick_chars(TICK_CHARS)
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .tick_chars(TICK_CHARS)
            .template("{spinner:.cyan} {msg:40} [{bar:30.cyan/dim}] {pos}/{len} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉░")
    }
}

impl ProgressSink for BarSink {
    fn start(&mut self, label: &str, total: Option<u64>) {
        if let Some(old) = self.bar.take() {
            old.finish_and_clear();
        }

        let bar = match (self.hidden, total) {
            (true, _) => ProgressBar::with_draw_target(total, ProgressDrawTarget::hidden()),
            (false, Some(total)) => {
                let bar = ProgressBar::new(total);
                bar.set_style(Self::bar_style());
                bar
            }
            (false, None) => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(Self::spinner_style());
                bar
            }
        };
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        self.label = label.to_string();
        self.bar = Some(bar);
    }

    fn update(&mut self, position: Option<u64>, label: Option<&str>) {
        let Some(bar) = &self.bar else {
            return;
        };
        if let Some(position) = position {
            bar.set_position(position);
        }
        if let Some(label) = label {
            self.label = label.to_string();
        }
        // Moving on drops any detail suffix left by the previous unit.
        bar.set_message(self.label.clone());
    }

    fn detail(&mut self, event: &ProgressEvent) {
        if !self.mode.shows_detail() {
            return;
        }
        let Some(bar) = &self.bar else {
            return;
        };
        let mut msg = self.label.clone();
        if let Some(phase) = &event.label {
            msg.push_str(" · ");
            msg.push_str(phase);
        }
        if let Some(percent) = event.percent {
            msg.push_str(&format!(" {}%", percent));
        }
        bar.set_message(msg);
    }

    fn stop(&mut self) {
        if let Some(bar) = self.bar.take() {
            if bar.length().is_some() {
                bar.finish();
            } else {
                bar.finish_and_clear();
            }
        }
    }
}

impl Drop for BarSink {
    fn drop(&mut self) {
        self.stop();
    }
}

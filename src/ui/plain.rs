//! Line-oriented progress for CI and other non-TTY output.

use std::io::Write;

use crate::progress::ProgressEvent;

use super::{OutputMode, ProgressSink};

/// Writes one line per state change instead of redrawing a bar.
///
/// Percentages from live steps are not printed; only phase changes are,
/// so log-based environments are not flooded.
pub struct PlainSink<W: Write> {
    out: W,
    mode: OutputMode,
    total: Option<u64>,
    position: u64,
    label: String,
    last_phase: Option<String>,
}

impl PlainSink<std::io::Stdout> {
    /// A sink writing to standard output.
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(std::io::stdout(), mode)
    }
}

impl<W: Write> PlainSink<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            total: None,
            position: 0,
            label: String::new(),
            last_phase: None,
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn counter(&self) -> String {
        match self.total {
            Some(total) => format!("[{}/{}] ", self.position, total),
            None => String::new(),
        }
    }
}

impl<W: Write> ProgressSink for PlainSink<W> {
    fn start(&mut self, label: &str, total: Option<u64>) {
        self.total = total;
        self.position = 0;
        self.label = label.to_string();
        self.last_phase = None;
        if self.mode.shows_status() {
            writeln!(self.out, "▸ {}", label).ok();
        }
    }

    fn update(&mut self, position: Option<u64>, label: Option<&str>) {
        if let Some(position) = position {
            self.position = position;
        }
        if let Some(label) = label {
            self.label = label.to_string();
            self.last_phase = None;
            if self.mode.shows_status() {
                writeln!(self.out, "{}{}", self.counter(), self.label).ok();
            }
        }
    }

    fn detail(&mut self, event: &ProgressEvent) {
        if !self.mode.shows_detail() {
            return;
        }
        if let Some(phase) = &event.label {
            if self.last_phase.as_deref() != Some(phase.as_str()) {
                writeln!(self.out, "    {}", phase).ok();
                self.last_phase = Some(phase.clone());
            }
        }
    }

    fn stop(&mut self) {
        if self.mode.shows_status() {
            match self.total {
                Some(total) if self.position >= total => {
                    writeln!(self.out, "[{}/{}] done", self.position, total).ok();
                }
                Some(total) => {
                    writeln!(self.out, "[{}/{}] stopped", self.position, total).ok();
                }
                None => {}
            }
        }
        self.out.flush().ok();
    }
}

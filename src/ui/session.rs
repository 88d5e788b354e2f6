//! Scoped progress sessions.

use crate::progress::ProgressEvent;

use super::ProgressSink;

/// Holds a [`ProgressSink`] between `start` and `stop`.
///
/// `stop` runs exactly once: on [`finish`](Self::finish), or on drop when
/// the session goes out of scope early (a `return`, a `?`, or a panic
/// unwinding through the caller).
pub struct ProgressSession<'a> {
    sink: &'a mut dyn ProgressSink,
    total: Option<u64>,
    position: u64,
    active: bool,
}

impl<'a> ProgressSession<'a> {
    /// Start `sink` and hold it until the session ends.
    pub fn begin(sink: &'a mut dyn ProgressSink, label: &str, total: Option<u64>) -> Self {
        sink.start(label, total);
        Self {
            sink,
            total,
            position: 0,
            active: true,
        }
    }

    /// Advance by one unit, optionally replacing the label.
    pub fn advance(&mut self, label: Option<&str>) {
        let next = self.position + 1;
        self.set_position(next, label);
    }

    /// Jump to `position`, clamped to the total when there is one.
    pub fn set_position(&mut self, position: u64, label: Option<&str>) {
        self.position = match self.total {
            Some(total) => position.min(total),
            None => position,
        };
        self.sink.update(Some(self.position), label);
    }

    /// Replace the label without moving.
    pub fn set_label(&mut self, label: &str) {
        self.sink.update(None, Some(label));
    }

    /// Render a command's live progress event as the session's position.
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event.percent {
            Some(percent) => self.set_position(u64::from(percent), event.label.as_deref()),
            None => {
                if let Some(label) = event.label.as_deref() {
                    self.set_label(label);
                }
            }
        }
    }

    /// Forward a sub-unit event without moving.
    pub fn detail(&mut self, event: &ProgressEvent) {
        self.sink.detail(event);
    }

    /// Jump to the total, if there is one.
    pub fn complete(&mut self) {
        if let Some(total) = self.total {
            self.set_position(total, None);
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// End the session now.
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            self.sink.stop();
        }
    }
}

impl Drop for ProgressSession<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

//! Mock sink for testing.
//!
//! `MockSink` implements [`ProgressSink`] and records every call for
//! later assertion.
//!
//! # Example
//!
//! ```
//! use stagehand::ui::{MockSink, ProgressSink};
//!
//! let mut sink = MockSink::new();
//! sink.start("Installing", Some(3));
//! sink.update(Some(1), Some("update"));
//! sink.stop();
//!
//! assert_eq!(sink.positions(), vec![1]);
//! assert_eq!(sink.labels(), vec!["update"]);
//! assert!(sink.is_stopped());
//! ```

use crate::progress::ProgressEvent;

use super::ProgressSink;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Start {
        label: String,
        total: Option<u64>,
    },
    Update {
        position: Option<u64>,
        label: Option<String>,
    },
    Detail(ProgressEvent),
    Stop,
}

/// Records all sink calls in order.
#[derive(Debug, Default)]
pub struct MockSink {
    calls: Vec<SinkCall>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, in order.
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Positions passed to `update`, skipping label-only updates.
    pub fn positions(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Update {
                    position: Some(p), ..
                } => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Labels passed to `update`, skipping position-only updates.
    pub fn labels(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Update {
                    label: Some(l), ..
                } => Some(l.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Events passed to `detail`.
    pub fn details(&self) -> Vec<&ProgressEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::Detail(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn start_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Start { .. }))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Stop))
            .count()
    }

    /// Whether the last call was `stop`.
    pub fn is_stopped(&self) -> bool {
        matches!(self.calls.last(), Some(SinkCall::Stop))
    }
}

impl ProgressSink for MockSink {
    fn start(&mut self, label: &str, total: Option<u64>) {
        self.calls.push(SinkCall::Start {
            label: label.to_string(),
            total,
        });
    }

    fn update(&mut self, position: Option<u64>, label: Option<&str>) {
        self.calls.push(SinkCall::Update {
            position,
            label: label.map(str::to_string),
        });
    }

    fn detail(&mut self, event: &ProgressEvent) {
        self.calls.push(SinkCall::Detail(event.clone()));
    }

    fn stop(&mut self) {
        self.calls.push(SinkCall::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut sink = MockSink::new();
        sink.start("a", None);
        sink.update(None, Some("b"));
        sink.detail(&ProgressEvent {
            percent: Some(10),
            label: None,
        });
        sink.stop();

        assert_eq!(sink.calls().len(), 4);
        assert_eq!(sink.start_count(), 1);
        assert_eq!(sink.stop_count(), 1);
        assert_eq!(sink.labels(), vec!["b"]);
        assert!(sink.positions().is_empty());
        assert_eq!(sink.details()[0].percent, Some(10));
    }

    #[test]
    fn not_stopped_until_stop() {
        let mut sink = MockSink::new();
        sink.start("a", Some(1));
        assert!(!sink.is_stopped());
    }
}

//! Incremental progress state for one command.

use serde::Serialize;

use super::rules::{extract_percent, PercentTriggers, PhaseRules};

/// A progress update for a running command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Completion in percent, `None` while indeterminate.
    pub percent: Option<u8>,
    /// Current phase label, if any rule has matched yet.
    pub label: Option<String>,
}

impl ProgressEvent {
    pub fn is_indeterminate(&self) -> bool {
        self.percent.is_none()
    }
}

/// Turns output lines into [`ProgressEvent`]s.
///
/// The percentage never decreases and never exceeds 100. An event is
/// produced only when the percentage rises or the phase label changes.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    rules: PhaseRules,
    triggers: PercentTriggers,
    percent: Option<u8>,
    label: Option<String>,
}

impl ProgressTracker {
    pub fn new(rules: PhaseRules, triggers: PercentTriggers) -> Self {
        Self {
            rules,
            triggers,
            percent: None,
            label: None,
        }
    }

    /// Tracker whose percentage triggers are derived from `rules`.
    pub fn with_rules(rules: PhaseRules) -> Self {
        let triggers = PercentTriggers::from_rules(&rules);
        Self::new(rules, triggers)
    }

    /// Feed one line (without its terminator).
    pub fn observe(&mut self, line: &str) -> Option<ProgressEvent> {
        let mut changed = false;

        if let Some(label) = self.rules.label_for(line) {
            if self.label.as_deref() != Some(label) {
                self.label = Some(label.to_string());
                changed = true;
            }
        }

        if self.triggers.accepts(line) {
            if let Some(percent) = extract_percent(line) {
                if self.percent.map_or(true, |current| percent > current) {
                    self.percent = Some(percent);
                    changed = true;
                }
            }
        }

        changed.then(|| self.current())
    }

    /// Close the stream. Returns a final 100% event unless 100 was already
    /// reported; the command's success does not matter.
    pub fn finish(&mut self) -> Option<ProgressEvent> {
        if self.percent == Some(100) {
            return None;
        }
        self.percent = Some(100);
        Some(self.current())
    }

    pub fn current(&self) -> ProgressEvent {
        ProgressEvent {
            percent: self.percent,
            label: self.label.clone(),
        }
    }

    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_rules(PhaseRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PhaseRule;

    fn feed(tracker: &mut ProgressTracker, lines: &[&str]) -> Vec<ProgressEvent> {
        let mut events: Vec<_> = lines.iter().filter_map(|l| tracker.observe(l)).collect();
        events.extend(tracker.finish());
        events
    }

    #[test]
    fn apt_style_output_yields_phases_and_percentages() {
        let mut tracker = ProgressTracker::default();
        let events = feed(
            &mut tracker,
            &[
                "Get:1 http://deb.debian.org/debian bookworm/main meshd 10%",
                "Unpacking meshd (2.5.0) ... 55%",
                "Setting up meshd (2.5.0) ... 100%",
            ],
        );

        let percents: Vec<_> = events.iter().map(|e| e.percent).collect();
        let labels: Vec<_> = events.iter().map(|e| e.label.as_deref()).collect();
        assert_eq!(percents, vec![Some(10), Some(55), Some(100)]);
        assert_eq!(
            labels,
            vec![
                Some("Downloading…"),
                Some("Unpacking packages…"),
                Some("Setting up packages…")
            ]
        );
    }

    #[test]
    fn starts_indeterminate() {
        let tracker = ProgressTracker::default();
        assert!(tracker.current().is_indeterminate());
        assert_eq!(tracker.label(), None);
    }

    #[test]
    fn lines_without_signal_hold_state() {
        let mut tracker = ProgressTracker::default();
        assert!(tracker.observe("Progress: [ 20%]").is_some());
        assert_eq!(tracker.observe("Reading database ..."), None);
        assert_eq!(tracker.percent(), Some(20));
    }

    #[test]
    fn percentage_never_decreases() {
        let mut tracker = ProgressTracker::with_rules(PhaseRules::empty());
        let events = feed(
            &mut tracker,
            &[
                "Progress: [ 40%]",
                "Progress: [ 30%]",
                "Progress: [ 40%]",
                "Progress: [ 70%]",
            ],
        );

        let percents: Vec<_> = events.iter().filter_map(|e| e.percent).collect();
        assert_eq!(percents, vec![40, 70, 100]);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn label_change_without_percentage_emits_held_value() {
        let mut tracker = ProgressTracker::default();
        tracker.observe("Progress: [ 35%]");
        let event = tracker.observe("Unpacking foo ...").unwrap();
        assert_eq!(event.percent, Some(35));
        assert_eq!(event.label.as_deref(), Some("Unpacking packages…"));
    }

    #[test]
    fn repeated_label_is_not_reemitted() {
        let mut tracker = ProgressTracker::default();
        assert!(tracker.observe("Unpacking a ...").is_some());
        assert_eq!(tracker.observe("Unpacking b ..."), None);
    }

    #[test]
    fn untriggered_percentages_are_ignored() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.observe("/dev/mmcblk0p2  29G  25G  87% /"), None);
        assert_eq!(tracker.percent(), None);
    }

    #[test]
    fn finish_reaches_hundred_once() {
        let mut tracker = ProgressTracker::default();
        let event = tracker.finish().unwrap();
        assert_eq!(event.percent, Some(100));
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn finish_after_hundred_is_silent() {
        let mut tracker = ProgressTracker::with_rules(PhaseRules::empty());
        tracker.observe("Progress: [100%]");
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn custom_rules_are_respected() {
        let rules = PhaseRules::new(vec![PhaseRule::new("Compiling", "Building firmware…")]);
        let mut tracker = ProgressTracker::new(rules, PercentTriggers::any());
        let event = tracker.observe("Compiling src/radio.c 12%").unwrap();
        assert_eq!(event.label.as_deref(), Some("Building firmware…"));
        assert_eq!(event.percent, Some(12));
    }
}

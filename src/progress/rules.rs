//! Line classification rules.
//!
//! Two independent questions are asked of every output line:
//!
//! - which phase is the command in? Answered by [`PhaseRules`], an ordered
//!   list where the first matching rule wins.
//! - how far along is it? Answered by [`extract_percent`], but only for
//!   lines accepted by [`PercentTriggers`], so a stray `disk usage: 87%`
//!   line cannot move the indicator.

use regex::Regex;
use std::sync::LazyLock;

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").unwrap());

/// Trigger accepted on top of the phase-rule needles.
pub const PROGRESS_TRIGGER: &str = "Progress:";

/// First `<digits>%` token on the line, clamped to 100.
pub fn extract_percent(line: &str) -> Option<u8> {
    let caps = RE_PERCENT.captures(line)?;
    let value: u32 = caps[1].parse().ok()?;
    Some(value.min(100) as u8)
}

/// Maps lines containing `needle` to a phase `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRule {
    needle: String,
    label: String,
}

impl PhaseRule {
    pub fn new(needle: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            label: label.into(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, line: &str) -> bool {
        line.contains(&self.needle)
    }
}

/// Ordered phase rules; earlier rules take priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRules {
    rules: Vec<PhaseRule>,
}

impl PhaseRules {
    pub fn new(rules: Vec<PhaseRule>) -> Self {
        Self { rules }
    }

    /// No rules: labels never change.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Rules for Debian package tooling (`apt-get`, `dpkg`).
    pub fn apt() -> Self {
        Self::new(vec![
            PhaseRule::new("Setting up", "Setting up packages…"),
            PhaseRule::new("Unpacking", "Unpacking packages…"),
            PhaseRule::new("Downloading", "Downloading…"),
            PhaseRule::new("Get:", "Downloading…"),
            PhaseRule::new("Installing", "Installing…"),
        ])
    }

    /// Append a rule with the lowest priority.
    pub fn push(&mut self, rule: PhaseRule) {
        self.rules.push(rule);
    }

    /// Label of the first rule matching `line`.
    pub fn label_for(&self, line: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map(PhaseRule::label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PhaseRules {
    fn default() -> Self {
        Self::apt()
    }
}

/// Which lines may carry a progress percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentTriggers {
    needles: Option<Vec<String>>,
}

impl PercentTriggers {
    /// Accept a percentage on any line.
    pub fn any() -> Self {
        Self { needles: None }
    }

    /// Accept a percentage only on lines containing one of `needles`.
    pub fn only<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: Some(needles.into_iter().map(Into::into).collect()),
        }
    }

    /// [`PROGRESS_TRIGGER`] plus the needle of every phase rule.
    pub fn from_rules(rules: &PhaseRules) -> Self {
        let mut needles = vec![PROGRESS_TRIGGER.to_string()];
        for rule in rules.iter() {
            if !needles.iter().any(|n| n == rule.needle()) {
                needles.push(rule.needle().to_string());
            }
        }
        Self {
            needles: Some(needles),
        }
    }

    pub fn accepts(&self, line: &str) -> bool {
        match &self.needles {
            None => true,
            Some(needles) => needles.iter().any(|n| line.contains(n.as_str())),
        }
    }
}

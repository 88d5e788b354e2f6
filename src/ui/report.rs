//! Text rendering of run results.

use std::time::Duration;

use crate::pipeline::{PipelineResult, StepResult};

use super::StagehandTheme;

/// Truncate `text` to at most `max_chars` characters, appending `...` when
/// anything was cut. Never splits a character.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Format duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// One line per attempted step, then a closing verdict.
pub fn render_summary(result: &PipelineResult, theme: &StagehandTheme) -> String {
    let mut lines: Vec<String> = result
        .steps()
        .iter()
        .map(|step| render_step(step, theme))
        .collect();

    lines.push(String::new());
    match result.failed_step() {
        None => {
            let optional = result.optional_failures().count();
            let msg = if optional == 0 {
                format!("{} steps completed", result.len())
            } else {
                format!(
                    "{} steps completed ({} optional failed)",
                    result.len(),
                    optional
                )
            };
            lines.push(theme.format_success(&msg));
        }
        Some(name) => {
            lines.push(theme.format_error(&format!("Stopped at step '{}'", name)));
        }
    }

    lines.join("\n")
}

fn render_step(step: &StepResult, theme: &StagehandTheme) -> String {
    let Some(outcome) = &step.outcome else {
        return theme.format_skipped(&format!("{} (not started)", step.name));
    };

    let took = theme
        .duration
        .apply_to(format!("({})", format_duration(outcome.duration())));

    match outcome.failure() {
        None => format!("{} {}", theme.format_success(&step.name), took),
        Some(failure) if step.optional => format!(
            "{} {}",
            theme.format_warning(&format!("{}: {} (optional)", step.name, failure)),
            took
        ),
        Some(failure) => format!(
            "{} {}",
            theme.format_error(&format!("{}: {}", step.name, failure)),
            took
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, StepDescriptor};
    use crate::shell::{CommandOutcome, CommandRunner, CommandSpec};
    use crate::ui::HiddenSink;

    #[test]
    fn excerpt_keeps_short_text() {
        assert_eq!(excerpt("  boom \n", 200), "boom");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("ééééé", 3), "ééé...");
        assert_eq!(excerpt("abc", 3), "abc");
        assert_eq!(excerpt("abcd", 3), "abc...");
    }

    #[test]
    fn format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    struct ExitRunner;

    impl CommandRunner for ExitRunner {
        fn run(&self, spec: &CommandSpec) -> CommandOutcome {
            let code = spec.to_string().parse().unwrap_or(0);
            CommandOutcome::exited(code, String::new(), String::new(), Duration::from_millis(3))
        }

        fn run_live(&self, spec: &CommandSpec, _: &mut dyn FnMut(&str)) -> CommandOutcome {
            self.run(spec)
        }
    }

    fn run(steps: Vec<StepDescriptor>) -> PipelineResult {
        Pipeline::new(steps)
            .unwrap()
            .run(&ExitRunner, &mut HiddenSink)
    }

    fn step(name: &str, code: &str, optional: bool) -> StepDescriptor {
        let spec = CommandSpec::parse(code, false).unwrap();
        if optional {
            StepDescriptor::optional(name, spec)
        } else {
            StepDescriptor::required(name, spec)
        }
    }

    #[test]
    fn summary_of_successful_run() {
        let result = run(vec![step("update", "0", false), step("cleanup", "2", true)]);
        let text = render_summary(&result, &StagehandTheme::plain());

        assert!(text.contains("✓ update (3ms)"));
        assert!(text.contains("⚠ cleanup: exited with code 2 (optional)"));
        assert!(text.ends_with("✓ 2 steps completed (1 optional failed)"));
    }

    #[test]
    fn summary_of_failed_run() {
        let result = run(vec![step("update", "0", false), step("configure", "1", false)]);
        let text = render_summary(&result, &StagehandTheme::plain());

        assert!(text.contains("✗ configure: exited with code 1"));
        assert!(text.ends_with("✗ Stopped at step 'configure'"));
    }
}

//! Integration tests for the `stagehand` binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_pipeline(yaml: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pipeline.yml");
    fs::write(&path, yaml).unwrap();
    (temp, path)
}

fn stagehand() -> Command {
    let mut cmd = Command::new(cargo_bin("stagehand"));
    cmd.arg("--no-color");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("live progress"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stagehand"));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    stagehand().assert().failure().code(2);
    Ok(())
}

#[test]
fn completions_generate_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stagehand"));
    Ok(())
}

#[test]
fn validate_accepts_good_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, path) = write_pipeline(
        r#"
steps:
  - name: update
    command: apt-get update
  - name: cleanup
    command: apt-get clean
    optional: true
"#,
    );
    stagehand()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (2 steps)"));
    Ok(())
}

#[test]
fn validate_reports_every_problem() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, path) = write_pipeline(
        r#"
steps:
  - name: update
  - name: update
    command: apt-get update
    timeout: 0
"#,
    );
    stagehand()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[missing-command]"))
        .stderr(predicate::str::contains("[duplicate-name]"))
        .stderr(predicate::str::contains("[invalid-timeout]"))
        .stderr(predicate::str::contains("3 problems found"));
    Ok(())
}

#[test]
fn validate_missing_file_is_invalid_input() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .args(["validate", "/nonexistent/pipeline.yml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Pipeline file not found"));
    Ok(())
}

#[test]
fn validate_unparseable_file_is_invalid_input() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, path) = write_pipeline("steps: [unclosed");
    stagehand()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse pipeline"));
    Ok(())
}

#[test]
fn run_rejects_invalid_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, path) = write_pipeline("steps: []\n");
    stagehand()
        .arg("run")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one step"));
    Ok(())
}

#[test]
fn dry_run_executes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let marker = temp.path().join("marker");
    let path = temp.path().join("pipeline.yml");
    fs::write(
        &path,
        format!(
            "steps:\n  - name: make-marker\n    command: [touch, '{}']\n",
            marker.display()
        ),
    )?;

    stagehand()
        .args(["run", "--dry-run"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. make-marker: touch"));
    assert!(!marker.exists());
    Ok(())
}

#[cfg(unix)]
mod unix {
    use super::*;

    const FAILING: &str = r#"
name: Installing meshd
steps:
  - name: update
    command: echo updated
  - name: configure
    command: echo 'dpkg was interrupted' >&2; exit 1
    shell: true
  - name: cleanup
    command: [touch, should-not-exist]
    optional: true
"#;

    #[test]
    fn run_succeeds_with_optional_failure() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp, path) = write_pipeline(
            r#"
steps:
  - name: first
    command: echo one
  - name: spi
    command: exit 2
    shell: true
    optional: true
  - name: last
    command: echo three
"#,
        );
        stagehand()
            .arg("run")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("3 steps completed (1 optional failed)"));
        Ok(())
    }

    #[test]
    fn run_stops_at_required_failure() -> Result<(), Box<dyn std::error::Error>> {
        let (temp, path) = write_pipeline(FAILING);
        stagehand()
            .current_dir(temp.path())
            .arg("run")
            .arg(&path)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Step 'configure' exited with code 1"))
            .stderr(predicate::str::contains("dpkg was interrupted"));
        assert!(!temp.path().join("should-not-exist").exists());
        Ok(())
    }

    #[test]
    fn run_json_reports_failed_step() -> Result<(), Box<dyn std::error::Error>> {
        let (temp, path) = write_pipeline(FAILING);
        let output = stagehand()
            .current_dir(temp.path())
            .args(["run", "--json"])
            .arg(&path)
            .output()?;

        assert_eq!(output.status.code(), Some(1));
        let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(json["success"], false);
        assert_eq!(json["failed_step"], "configure");
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["name"], "update");
        assert_eq!(steps[1]["outcome"]["stderr"], "dpkg was interrupted\n");
        Ok(())
    }

    #[test]
    fn run_verbose_shows_command_output() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp, path) = write_pipeline("steps:\n  - name: hello\n    command: echo hello-from-step\n");
        stagehand()
            .args(["--verbose", "run"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("hello-from-step"));
        Ok(())
    }

    #[test]
    fn exec_forwards_output() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args(["exec", "--", "echo", "hello"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hello"));
        Ok(())
    }

    #[test]
    fn exec_shell_mode() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args(["exec", "--shell", "--", "echo a && echo b"])
            .assert()
            .success()
            .stdout(predicate::str::contains("a\nb\n"));
        Ok(())
    }

    #[test]
    fn exec_failure_exits_one() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args(["exec", "--", "false"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("exited with code 1"));
        Ok(())
    }

    #[test]
    fn exec_missing_binary_fails_to_start() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args(["exec", "--", "definitely-not-a-real-binary-xyz"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to start"));
        Ok(())
    }

    #[test]
    fn exec_timeout_kills_command() -> Result<(), Box<dyn std::error::Error>> {
        let started = std::time::Instant::now();
        stagehand()
            .args(["exec", "--timeout", "1", "--", "sleep", "10"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("timed out after 1s"));
        assert!(started.elapsed() < std::time::Duration::from_secs(8));
        Ok(())
    }

    #[test]
    fn exec_live_progress() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args([
                "exec",
                "--live",
                "--shell",
                "--label",
                "Installing",
                "--",
                "echo 'Unpacking meshd 55%'; echo 'Setting up meshd 100%'",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Setting up packages…"));
        Ok(())
    }

    #[test]
    fn exec_zero_timeout_is_invalid() -> Result<(), Box<dyn std::error::Error>> {
        stagehand()
            .args(["exec", "--timeout", "0", "--", "true"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid command"));
        Ok(())
    }
}

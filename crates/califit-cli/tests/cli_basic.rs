//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_califit"))
        .args(args)
        .env("CALIFIT_HOME", home)
        .env_remove("CALIFIT_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_config_list_writes_defaults() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["config", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["rest_duration"], 60);
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "set", "timer.rest_duration", "90"]).trim(),
        "ok"
    );
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "timer.rest_duration"]).trim(),
        "90"
    );
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
}

#[test]
fn test_format_negative_is_overtime() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(run_cli_success(home.path(), &["format", "-5"]).trim(), "-00:05");
    assert_eq!(run_cli_success(home.path(), &["format", "65"]).trim(), "01:05");
    assert_eq!(
        run_cli_success(home.path(), &["format", "--elapsed", "3725"]).trim(),
        "1:02:05"
    );
}

#[test]
fn test_workout_validate() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("push.toml");
    std::fs::write(
        &plan,
        "name = \"Push\"\n\n[[exercise]]\nname = \"Push-up\"\nsets = 3\n\n[[exercise]]\nname = \"Plank\"\nsets = 2\nduration_secs = 45\n",
    )
    .unwrap();

    let stdout = run_cli_success(home.path(), &["workout", "validate", plan.to_str().unwrap()]);
    assert!(stdout.starts_with("Push: 2 exercises, 5 sets"));
    assert!(stdout.contains("Plank 2x 00:45"));
}

#[test]
fn test_workout_validate_rejects_empty_plan() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("empty.toml");
    std::fs::write(&plan, "name = \"Nothing\"\n").unwrap();

    let (_, stderr, code) = run_cli(home.path(), &["workout", "validate", plan.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_timer_run_completes_once() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        home.path(),
        &[
            "timer",
            "run",
            "--exercise-duration",
            "1",
            "--auto-start",
            "--mute",
            "--json",
        ],
    );

    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(types.first(), Some(&"SessionConfigured"));
    assert_eq!(
        types.iter().filter(|t| **t == "CountdownTick").count(),
        3
    );
    assert_eq!(
        types.iter().filter(|t| **t == "IntervalCompleted").count(),
        1
    );
    let last = events.last().unwrap();
    assert_eq!(last["type"], "IntervalCompleted");
    assert_eq!(last["manual"], false);
    assert_eq!(last["seconds"], 0);
}

#[test]
fn test_workout_run_follows_piped_input() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("pull.toml");
    std::fs::write(
        &plan,
        "name = \"Pull\"\n\n[[exercise]]\nname = \"Pull-up\"\nsets = 2\ntarget_reps = 10\nrest_secs = 90\n",
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_califit"))
        .args(["workout", "run", plan.to_str().unwrap(), "--json", "--mute"])
        .env("CALIFIT_HOME", home.path())
        .env_remove("CALIFIT_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    // Set 1: done, one more rep in rest, next set. Set 2: done, log 7 reps, finish.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"d\n+\nd\nd\n7\nd\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let steps: Vec<&str> = lines
        .iter()
        .filter(|l| l["type"] == "WorkoutStep")
        .filter_map(|l| l["step"].as_str())
        .collect();
    assert_eq!(steps, vec!["rest", "next_set", "rest", "finished"]);

    let finished = lines.last().unwrap();
    assert_eq!(finished["type"], "WorkoutFinished");
    let summary = &finished["summary"];
    assert_eq!(summary["total_sets"], 2);
    assert_eq!(summary["completed_sets"], 2);
    assert_eq!(summary["total_reps"], 18);
    assert_eq!(summary["exercises"][0]["reps"], serde_json::json!([11, 7]));
}

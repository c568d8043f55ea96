use runlog_core::testing::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn run_cli(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_runlog"))
        .args(args)
        .env_remove("RUNLOG_CONFIG")
        .env("RUST_LOG", "off")
        .output()
        .expect("run runlog")
}

fn write_session(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let body = to_jsonl(&[
        legacy(
            "SystemMessage",
            "2026-02-28T12:00:00Z",
            json!({"model": "claude-3", "cwd": "/repo"}),
        ),
        legacy(
            "ResultMessage",
            "2026-02-28T12:00:45Z",
            json!({"usage": {"input_tokens": 100, "output_tokens": 50}}),
        ),
    ]);
    fs::write(&path, body).expect("write session");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn generates_report_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_session(dir.path(), "run.jsonl");

    let output = run_cli(&[&input]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let expected = dir.path().join("run.html");
    let out = stdout(&output);
    assert!(out.contains(&format!("Generating report for: {}", input.display())));
    assert!(out.contains(&format!("Generated: {}", expected.display())));

    let html = fs::read_to_string(&expected).expect("report written");
    assert!(html.contains("claude-3"));
    assert!(html.contains("45.0s"));
}

#[test]
fn writes_into_output_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_session(dir.path(), "run.jsonl");
    let out_dir = dir.path().join("reports");

    let output = run_cli(&[&input, &out_dir]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out_dir.join("run.html").exists());
    assert!(!dir.path().join("run.html").exists());
}

#[test]
fn no_arguments_prints_usage() {
    let output = run_cli(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage: runlog <jsonl_path> [output_dir]"));
}

#[test]
fn missing_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("absent.jsonl");

    let output = run_cli(&[&input]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: File not found:"));
}

#[test]
fn wrong_extension_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("run.json");
    fs::write(&input, "{}\n").expect("write");

    let output = run_cli(&[&input]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: File must be a .jsonl file, got: .json"));
    assert!(!dir.path().join("run.html").exists());
}

#[test]
fn malformed_log_reports_generation_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.jsonl");
    fs::write(&input, "{\"type\":\"SystemMessage\"}\nnot json\n").expect("write");

    let output = run_cli(&[&input]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error generating report:"));
    assert!(err.contains("line 2"), "stderr: {err}");
    assert!(!dir.path().join("broken.html").exists());
}

#[test]
fn config_from_environment_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_session(dir.path(), "run.jsonl");
    let config = dir.path().join("runlog.toml");
    fs::write(&config, "[display]\ntimezone = \"utc\"\ntime_format = \"%H.%M\"\n")
        .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_runlog"))
        .arg(&input)
        .env("RUNLOG_CONFIG", &config)
        .env("RUST_LOG", "off")
        .output()
        .expect("run runlog");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let html = fs::read_to_string(dir.path().join("run.html")).expect("report written");
    assert!(html.contains("<span class=\"message-time\">12.00</span>"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_session(dir.path(), "run.jsonl");
    let config = dir.path().join("runlog.toml");
    fs::write(&config, "[display]\ntimezone = \"mars\"\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_runlog"))
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .env_remove("RUNLOG_CONFIG")
        .output()
        .expect("run runlog");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to load report settings"));
}

//! CLI integration tests

use std::process::Command;

fn aims(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_aims"))
        .args(args)
        .env_remove("AIMS_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = aims(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("AIMS"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("faults"), "Should show faults command");
    assert!(stdout.contains("scenarios"), "Should show scenarios command");
    assert!(stdout.contains("AIMS_API_URL"), "Should mention env var");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = aims(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("aims"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let output = aims(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    assert!(stdout.contains("--file"), "Should show file option");
    assert!(stdout.contains("--scenario"), "Should show scenario option");
    assert!(stdout.contains("--top"), "Should show top option");
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let output = aims(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

/// Test that predict requires a reading source
#[test]
fn test_predict_without_source() {
    let output = aims(&["predict"]);
    assert!(!output.status.success(), "Predict without a source should fail");
}

/// Test unknown scenario names are rejected before any request is made
#[test]
fn test_unknown_scenario() {
    let output = aims(&["predict", "--scenario", "meltdown"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown scenario"));
}

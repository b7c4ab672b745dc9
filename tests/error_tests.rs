//! Error scenario integration tests

use std::process::Command;

fn voice_memos_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_voice-memos"))
}

#[test]
fn config_get_unknown_key() {
    let output = voice_memos_bin()
        .args(["config", "get", "api_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown key") && stderr.contains("frame_rate"),
        "Expected error listing valid keys, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let output = voice_memos_bin()
        .args(["config", "set", "duration", "10s"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown key"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_frame_rate() {
    let output = voice_memos_bin()
        .args(["config", "set", "frame_rate", "fast"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("frame_rate") && stderr.contains("1 to 240"),
        "Expected error about frame rate range, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_boolean() {
    let output = voice_memos_bin()
        .args(["config", "set", "cues", "maybe"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("true") || stderr.contains("false"),
        "Expected error about invalid boolean, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_log_filter() {
    let output = voice_memos_bin()
        .args(["config", "set", "log_level", "voice_memos=loud"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("log_level"),
        "Expected error about log filter, got: {}",
        stderr
    );
}

#[test]
fn config_list_with_no_file() {
    let output = voice_memos_bin()
        .args(["config", "list"])
        .env("HOME", "/nonexistent")
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("not set"),
        "Expected config list output, got: {}",
        stdout
    );
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let output = voice_memos_bin()
        .arg("transcribe")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn voice_memos_bin() -> Command {
    Command::cargo_bin("voice-memos").expect("binary is built")
}

#[test]
fn help_output() {
    voice_memos_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audio clips"))
        .stdout(predicate::str::contains("--storage-dir"))
        .stdout(predicate::str::contains("--frame-rate"))
        .stdout(predicate::str::contains("--cues"))
        .stdout(predicate::str::contains("--log-level"));
}

#[test]
fn version_output() {
    voice_memos_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voice-memos"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_help() {
    voice_memos_bin()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn frame_rate_out_of_range_is_rejected() {
    voice_memos_bin()
        .args(["--frame-rate", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("frame-rate"));
}

#[cfg(target_os = "linux")]
mod with_config_home {
    use super::*;

    fn in_config_home(dir: &tempfile::TempDir) -> Command {
        let mut cmd = voice_memos_bin();
        cmd.env("XDG_CONFIG_HOME", dir.path())
            .env_remove("VOICE_MEMOS_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn config_path_points_into_config_home() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join("voice-memos").join("config.toml");
        in_config_home(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.to_string_lossy().as_ref()));
    }

    #[test]
    fn config_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        in_config_home(&dir)
            .args(["config", "set", "frame_rate", "30"])
            .assert()
            .success();
        in_config_home(&dir)
            .args(["config", "get", "frame_rate"])
            .assert()
            .success()
            .stdout(predicate::str::diff("30\n"));
    }

    #[test]
    fn config_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        in_config_home(&dir).args(["config", "init"]).assert().success();
        in_config_home(&dir)
            .args(["config", "init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn config_list_shows_every_key() {
        let dir = tempfile::tempdir().unwrap();
        in_config_home(&dir)
            .args(["config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("storage_dir"))
            .stdout(predicate::str::contains("frame_rate"))
            .stdout(predicate::str::contains("cues"))
            .stdout(predicate::str::contains("log_level"));
    }

    #[test]
    fn shell_lists_and_quits() {
        let dir = tempfile::tempdir().unwrap();
        let clips = dir.path().join("clips");
        in_config_home(&dir)
            .arg("--storage-dir")
            .arg(&clips)
            .write_stdin("help\nlist\nquit\n")
            .timeout(std::time::Duration::from_secs(20))
            .assert()
            .success()
            .stdout(predicate::str::contains("No recordings yet"))
            .stdout(predicate::str::contains("rename <n> <title>"));
    }

    #[test]
    fn shell_exits_at_end_of_input() {
        let dir = tempfile::tempdir().unwrap();
        in_config_home(&dir)
            .arg("--storage-dir")
            .arg(dir.path().join("clips"))
            .write_stdin("status\n")
            .timeout(std::time::Duration::from_secs(20))
            .assert()
            .success()
            .stderr(predicate::str::contains("0 recording(s)"));
    }

    #[test]
    fn shell_reports_bad_commands_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        in_config_home(&dir)
            .arg("--storage-dir")
            .arg(dir.path().join("clips"))
            .write_stdin("dance\nplay 3\nlist\n")
            .timeout(std::time::Duration::from_secs(20))
            .assert()
            .success()
            .stderr(predicate::str::contains("Unknown command 'dance'"))
            .stderr(predicate::str::contains("No recording at index 2"))
            .stdout(predicate::str::contains("No recordings yet"));
    }

    #[test]
    fn broken_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("voice-memos");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "frame_rate = [").unwrap();

        in_config_home(&dir)
            .arg("--storage-dir")
            .arg(dir.path().join("clips"))
            .write_stdin("quit\n")
            .timeout(std::time::Duration::from_secs(20))
            .assert()
            .success()
            .stderr(predicate::str::contains("Ignoring config file"));
    }
}

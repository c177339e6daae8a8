use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn minutes(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("minutes").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

// ---------------------------------------------------------------------------
// minutes init-config
// ---------------------------------------------------------------------------

#[test]
fn init_config_writes_a_loadable_file() {
    let dir = TempDir::new().unwrap();
    minutes(&dir).arg("init-config").assert().success();

    let raw = std::fs::read_to_string(dir.path().join("minutes.yaml")).unwrap();
    let config: minutes_core::config::Config = serde_yaml::from_str(&raw).unwrap();
    assert_eq!(config.port, 8717);
    assert!(config.sessions.is_empty());
}

#[test]
fn init_config_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("minutes.yaml"), "port: 9999\n").unwrap();

    minutes(&dir)
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let raw = std::fs::read_to_string(dir.path().join("minutes.yaml")).unwrap();
    assert_eq!(raw, "port: 9999\n");
}

// ---------------------------------------------------------------------------
// argument validation
// ---------------------------------------------------------------------------

#[test]
fn board_requires_a_token() {
    let dir = TempDir::new().unwrap();
    minutes(&dir)
        .arg("board")
        .env_remove("MINUTES_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[test]
fn extract_rejects_a_malformed_note_id() {
    let dir = TempDir::new().unwrap();
    minutes(&dir)
        .args(["extract", "--token", "tok", "--note", "not-a-uuid"])
        .assert()
        .failure();
}

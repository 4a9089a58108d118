use assert_cmd::Command;
use predicates::prelude::*;

fn tubescript() -> Command {
    let mut cmd = Command::cargo_bin("tubescript").expect("binary built");
    cmd.env_remove("TUBESCRIPT_CONFIG").env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_subcommands() {
    tubescript()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("tracks"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn fetch_rejects_empty_input() {
    tubescript()
        .args(["fetch", "", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video ID or URL"));
}

#[test]
fn fetch_rejects_non_youtube_url() {
    tubescript()
        .args(["fetch", "https://example.com/watch?v=dQw4w9WgXcQ", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video ID or URL"));
}

#[test]
fn fetch_rejects_unknown_format() {
    tubescript()
        .args(["fetch", "dQw4w9WgXcQ", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tubescript.yaml");

    tubescript()
        .arg("config")
        .arg("--init")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Default configuration written"));
    assert!(path.exists());

    tubescript()
        .arg("config")
        .arg("--show")
        .env("TUBESCRIPT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Retries: 3 (1000 ms apart)"))
        .stdout(predicate::str::contains("Default Format: text"));
}

#[test]
fn broken_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "http: [not, a, map").unwrap();

    tubescript()
        .args(["config", "--show", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

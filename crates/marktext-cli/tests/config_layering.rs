//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use marktext_test_support::SyntheticImageBuilder;
use predicates::prelude::*;

fn marktext(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("marktext").unwrap();
    cmd.current_dir(home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

fn photos(home: &Path, count: usize) -> PathBuf {
    let dir = home.join("photos");
    fs::create_dir_all(&dir).unwrap();
    for i in 0..count {
        SyntheticImageBuilder::uniform_gray(16, 16, 100)
            .image
            .save(dir.join(format!("p{i}.png")))
            .unwrap();
    }
    dir
}

fn write_xdg_config(home: &Path, content: &str) {
    let dir = home.join("config").join("marktext");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

fn line_count(stdout: &[u8]) -> usize {
    String::from_utf8_lossy(stdout).lines().count()
}

#[test]
fn test_project_config_applies_format() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 2);
    fs::write(home.path().join(".marktext.toml"), "[output]\nformat = 'json'\n").unwrap();

    marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_cli_format_overrides_project_config() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 2);
    fs::write(home.path().join(".marktext.toml"), "[output]\nformat = 'json'\n").unwrap();

    let output = marktext(home.path())
        .arg(&dir)
        .args(["--format", "jsonl", "--dry-run"])
        .output()
        .unwrap();

    assert_eq!(line_count(&output.stdout), 2);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with('{'));
}

#[test]
fn test_project_config_found_in_parent() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 4);
    fs::write(home.path().join(".marktext.toml"), "[general]\nlimit = 3\n").unwrap();
    let nested = home.path().join("work").join("deep");
    fs::create_dir_all(&nested).unwrap();

    let output = marktext(home.path())
        .current_dir(&nested)
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert_eq!(line_count(&output.stdout), 3);
}

#[test]
fn test_xdg_config_applies() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 4);
    write_xdg_config(home.path(), "[general]\nlimit = 1\n");

    let output = marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert_eq!(line_count(&output.stdout), 1);
}

#[test]
fn test_project_config_overrides_xdg() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 4);
    write_xdg_config(home.path(), "[general]\nlimit = 1\n");
    fs::write(home.path().join(".marktext.toml"), "[general]\nlimit = 2\n").unwrap();

    let output = marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert_eq!(line_count(&output.stdout), 2);
}

#[test]
fn test_cli_limit_overrides_config() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 4);
    fs::write(home.path().join(".marktext.toml"), "[general]\nlimit = 1\n").unwrap();

    let output = marktext(home.path())
        .arg(&dir)
        .args(["--limit", "0", "--dry-run"])
        .output()
        .unwrap();

    assert_eq!(line_count(&output.stdout), 4);
}

#[test]
fn test_config_recursive() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 1);
    let sub = dir.join("more");
    fs::create_dir(&sub).unwrap();
    SyntheticImageBuilder::uniform_gray(16, 16, 100)
        .image
        .save(sub.join("q.png"))
        .unwrap();

    let flat = marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();
    assert_eq!(line_count(&flat.stdout), 1);

    fs::write(home.path().join(".marktext.toml"), "[general]\nrecursive = true\n").unwrap();
    let deep = marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();
    assert_eq!(line_count(&deep.stdout), 2);
}

#[test]
fn test_config_preference_path() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 1);
    let prefs = home.path().join("team-prefs.toml");
    fs::write(&prefs, "prefix = \"Team\"\n").unwrap();
    fs::write(
        home.path().join(".marktext.toml"),
        format!("[preferences]\npath = '{}'\n", prefs.display()),
    )
    .unwrap();

    marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\":\"Team\""));
}

#[test]
fn test_invalid_config_value_warns() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 1);
    fs::write(home.path().join(".marktext.toml"), "[output]\nformat = 'xml'\n").unwrap();

    marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("output.format"));
}

#[test]
fn test_malformed_config_is_ignored() {
    let home = tempfile::tempdir().unwrap();
    let dir = photos(home.path(), 2);
    fs::write(home.path().join(".marktext.toml"), "[general\nlimit = 1").unwrap();

    let output = marktext(home.path())
        .arg(&dir)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(line_count(&output.stdout), 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config file"));
}

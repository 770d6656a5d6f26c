//! CLI end-to-end tests
//!
//! Tests for the thumbforge command-line interface.

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the thumbforge binary
#[allow(deprecated)]
fn thumbforge_cmd() -> Command {
    Command::cargo_bin("thumbforge").unwrap()
}

/// Write a config using a SQLite database and media directory inside `dir`.
fn write_config(dir: &Path) -> PathBuf {
    let media = dir.join("media");
    fs::create_dir_all(&media).unwrap();
    let config = format!(
        r#"
[storage]
location = "{}"

[metadata]
backend = "sqlite"
path = "{}"

[sizes.small]
width = 16
height = 16

[sizes.large]
width = 48
height = 48
format = "jpeg"
"#,
        media.display(),
        dir.join("meta.db").display()
    );
    let path = dir.join("thumbforge.toml");
    fs::write(&path, config).unwrap();
    path
}

/// Ingest a generated image and return its storage name.
fn ingest(config: &Path, dir: &Path) -> String {
    let image = dir.join("photo.png");
    fs::write(&image, common::png_bytes(64, 32)).unwrap();

    let output = thumbforge_cmd()
        .arg("--config")
        .arg(config)
        .args(["ingest", "--name", "avatars/photo.png"])
        .arg(&image)
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = thumbforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("thumbforge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("thumbforge"));
}

#[test]
fn test_cli_prefetch_help() {
    let mut cmd = thumbforge_cmd();
    cmd.args(["prefetch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("one batch"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    let mut cmd = thumbforge_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Sizes: 2"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[sizes.get]\nwidth = 10\nheight = 10\n").unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.arg("validate").arg(&config).assert().failure();
}

#[test]
fn test_cli_sizes() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    let mut cmd = thumbforge_cmd();
    cmd.arg("--config")
        .arg(&config)
        .arg("sizes")
        .assert()
        .success()
        .stdout(predicate::str::contains("small: 16x16 fit (source)"))
        .stdout(predicate::str::contains("large: 48x48 fit (jpeg)"));
}

#[test]
fn test_cli_thumbnail_lifecycle() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let source = ingest(&config, dir.path());
    assert!(source.starts_with("avatars/"));
    assert!(dir.path().join("media").join(&source).exists());

    let output = thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["get", source.as_str(), "small"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let name = stdout.split('\t').next().unwrap().to_string();
    assert!(name.starts_with("thumbs/avatars/"));
    assert!(stdout.contains(&format!("/media/{}", name)));
    assert!(dir.path().join("media").join(&name).exists());

    // Same thumbnail on a second run
    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["get", source.as_str(), "small"])
        .assert()
        .success()
        .stdout(predicate::str::contains(name.as_str()));

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["list", source.as_str(), "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"small\""))
        .stdout(predicate::str::contains(name.as_str()));

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["delete", source.as_str(), "small"])
        .assert()
        .success();
    assert!(!dir.path().join("media").join(&name).exists());

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["list", source.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No thumbnails"));
}

#[test]
fn test_cli_generate_and_prefetch() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let source = ingest(&config, dir.path());

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["generate", source.as_str(), "large"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_large.jpg"));

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["prefetch", source.as_str(), "avatars/other.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}: large", source)))
        .stdout(predicate::str::contains("avatars/other.png:"));
}

#[test]
fn test_cli_unknown_size_fails() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let source = ingest(&config, dir.path());

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["get", source.as_str(), "huge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown size: huge"));
}

#[test]
fn test_cli_ingest_missing_file() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());

    thumbforge_cmd()
        .arg("--config")
        .arg(&config)
        .args(["ingest", "/nonexistent/photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

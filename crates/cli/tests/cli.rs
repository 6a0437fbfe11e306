use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn help_lists_sync_flags() {
    Command::cargo_bin("galsync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--overwrite"))
        .stdout(predicate::str::contains("--keep-going"));
}

#[test]
fn unconfigured_upload_skips_without_failing() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("gallery.toml");
    fs::write(&settings, "title = \"My Gallery\"\n").unwrap();
    let build = dir.path().join("_build");
    fs::create_dir(&build).unwrap();

    Command::cargo_bin("galsync")
        .unwrap()
        .arg(&build)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn missing_settings_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("_build");
    fs::create_dir(&build).unwrap();

    Command::cargo_bin("galsync")
        .unwrap()
        .arg(&build)
        .arg("--settings")
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings file not found"));
}

#[test]
fn invalid_policy_is_fatal() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("gallery.toml");
    fs::write(
        &settings,
        "[upload_s3]\nbucket = \"b\"\npolicy = \"world-writable\"\n",
    )
    .unwrap();
    let build = dir.path().join("_build");
    fs::create_dir(&build).unwrap();

    Command::cargo_bin("galsync")
        .unwrap()
        .arg(&build)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .failure();
}

//! End-to-end checks of the `qsync` binary that need no network.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

fn qsync() -> Command {
    let mut cmd = Command::cargo_bin("qsync").unwrap();
    cmd.env_remove("QIITA_ACCESS_TOKEN")
        .env_remove("GITHUB_REF")
        .env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?}");
}

#[test]
fn test_version_text() {
    let output = qsync().arg("version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(&format!("qsync version {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_json() {
    let output = qsync().args(["--json", "version"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(value["api"], "https://qiita.com/api/v2");
}

#[test]
fn test_help_lists_article_commands() {
    let output = qsync().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for sub in ["download", "upload", "check", "delete", "sync", "purge"] {
        assert!(stdout.contains(sub), "{sub}");
    }
}

#[test]
fn test_unknown_conflict_policy_is_a_usage_error() {
    qsync()
        .args(["sync", ".", "--on-conflict", "merge"])
        .assert()
        .failure();
}

#[test]
fn test_missing_target_fails() {
    let dir = TempDir::new().unwrap();
    let output = qsync()
        .arg("check")
        .arg(dir.path().join("missing.md"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn test_outside_git_repository_fails() {
    let dir = TempDir::new().unwrap();
    let ceiling = dir.path().parent().unwrap();
    qsync()
        .arg("check")
        .arg(dir.path())
        .env("GIT_CEILING_DIRECTORIES", ceiling)
        .assert()
        .failure();
}

#[test]
fn test_missing_token_is_reported_with_hint() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(
        dir.path(),
        &["remote", "add", "origin", "git@github.com:someone/articles.git"],
    );

    let output = qsync().arg("check").arg(dir.path()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("access token"), "{stderr}");
    assert!(stderr.contains("Hint:"), "{stderr}");

    let output = qsync()
        .args(["--json", "check"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["error"]["code"], "CONFIG_ERROR");
}

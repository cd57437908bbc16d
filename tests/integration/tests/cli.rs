//! CLI integration tests.
//!
//! The first group calls `setenv_cli::run` in-process; the second exercises
//! the compiled `setenv` binary for routing, help text and exit codes.

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Parser;
use setenv_cli::{run, Cli};
use setenv_core::{paths, Passphrase};
use setenv_integration_tests::{project, write_contexts};
use setenv_secrets::SecretManager;

async fn setenv(root: &Path, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec![
        "setenv".to_string(),
        "--root".to_string(),
        root.display().to_string(),
        "--password".to_string(),
        "correct-horse".to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    run(Cli::try_parse_from(argv)?).await
}

#[tokio::test]
async fn test_secrets_set_then_generate() {
    let dir = project();
    setenv(dir.path(), &["secrets", "set", "dev", "ADMIN_PASSWORD", "--value", "s3cret"])
        .await
        .unwrap();
    setenv(dir.path(), &["secrets", "set", "GLOBAL", "API_KEY", "--value", "abc 123"])
        .await
        .unwrap();
    setenv(dir.path(), &["generate", "--context", "dev", "--no-prompt"])
        .await
        .unwrap();

    let env = std::fs::read_to_string(paths::env_file(dir.path())).unwrap();
    assert!(env.contains("APP_NAME=workspace\n"), "{env}");
    assert!(env.contains("BASE_URL=http://localhost:4200\n"), "{env}");
    assert!(env.contains("PORT=4200\n"), "{env}");
    assert!(env.contains("ADMIN_PASSWORD=s3cret\n"), "{env}");
    assert!(env.contains("API_KEY=\"abc 123\"\n"), "{env}");
}

#[tokio::test]
async fn test_generate_missing_secret_without_prompt() {
    let dir = project();
    let err = setenv(dir.path(), &["generate", "--context", "dev", "--no-prompt"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ADMIN_PASSWORD"), "{err}");
    assert!(!paths::env_file(dir.path()).exists());
}

#[tokio::test]
async fn test_generate_without_secrets_needs_no_password() {
    let dir = project();
    let output = dir.path().join("out").join("staging.env");
    let argv = [
        "setenv",
        "--root",
        &dir.path().display().to_string(),
        "generate",
        "--context",
        "staging",
        "--output",
        &output.display().to_string(),
    ]
    .map(String::from);
    run(Cli::try_parse_from(argv).unwrap()).await.unwrap();

    let env = std::fs::read_to_string(&output).unwrap();
    assert!(env.contains("BASE_URL=https://staging.example.com\n"), "{env}");
    assert!(!SecretManager::is_enabled(dir.path()));
}

#[tokio::test]
async fn test_unknown_context_rejected() {
    let dir = project();
    let err = setenv(dir.path(), &["generate", "--context", "production"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("production"), "{err}");

    let err = setenv(dir.path(), &["secrets", "set", "production", "K", "--value", "v"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown context"), "{err}");
}

#[tokio::test]
async fn test_rotate_and_delete() {
    let dir = project();
    setenv(dir.path(), &["secrets", "set", "dev", "ADMIN_PASSWORD", "--value", "s3cret"])
        .await
        .unwrap();
    setenv(dir.path(), &["secrets", "rotate", "--new-password", "battery-staple"])
        .await
        .unwrap();

    let err = setenv(dir.path(), &["secrets", "get", "dev"]).await.unwrap_err();
    assert!(err.to_string().contains("Invalid password"), "{err}");

    let mut manager =
        SecretManager::for_project(dir.path(), Passphrase::new("battery-staple")).unwrap();
    manager.load().await.unwrap();
    assert!(manager.has_secret("dev", "ADMIN_PASSWORD").unwrap());
    assert!(manager.delete_secret("dev", "ADMIN_PASSWORD").unwrap());
    manager.persist().await.unwrap();

    let report = setenv_secrets::inspect(&paths::secrets_file(dir.path()))
        .await
        .unwrap();
    assert!(report.entries.is_empty());
}

#[tokio::test]
async fn test_delete_missing_secret_fails() {
    let dir = project();
    setenv(dir.path(), &["secrets", "set", "dev", "ADMIN_PASSWORD", "--value", "s3cret"])
        .await
        .unwrap();
    let err = setenv(dir.path(), &["secrets", "delete", "dev", "NOPE"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn test_bin_get_without_store_does_not_prompt() {
    let dir = project();
    let output = setenv_cmd(dir.path())
        .args(["secrets", "get", "GLOBAL"])
        .output()
        .expect("failed to run setenv");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No secret store"), "got: {}", stderr);
    assert!(!paths::secrets_file(dir.path()).exists());
}

#[tokio::test]
async fn test_doctor_reports_bad_contexts_file() {
    let dir = project();
    write_contexts(dir.path(), "{ broken");
    assert!(setenv(dir.path(), &["doctor"]).await.is_err());

    write_contexts(dir.path(), "{ dev: {} }");
    setenv(dir.path(), &["doctor"]).await.unwrap();
}

/// Locate the compiled `setenv` binary in the workspace target directory.
///
/// `CARGO_MANIFEST_DIR` is `tests/integration`; the workspace root is two
/// levels up.
fn setenv_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let bin = workspace_root.join("target").join("debug").join("setenv");
    assert!(
        bin.exists(),
        "setenv binary not found at {}; run `cargo build -p setenv-cli` first",
        bin.display()
    );
    bin
}

fn setenv_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(setenv_bin());
    cmd.env_remove("SETENV_PASSWORD")
        .env_remove("SETENV_NEW_PASSWORD")
        .env("SETENV_ROOT", root);
    cmd
}

#[test]
fn test_bin_version() {
    let dir = project();
    let output = setenv_cmd(dir.path())
        .arg("version")
        .output()
        .expect("failed to run setenv");
    assert!(output.status.success(), "version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("setenv"), "got: {}", stdout);
}

#[test]
fn test_bin_help() {
    let dir = project();
    let output = setenv_cmd(dir.path())
        .arg("--help")
        .output()
        .expect("failed to run setenv");
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("generate"), "got: {}", stdout);
    assert!(stdout.contains("secrets"), "got: {}", stdout);
}

#[test]
fn test_bin_unknown_command() {
    let dir = project();
    let output = setenv_cmd(dir.path())
        .arg("nonexistent-command")
        .output()
        .expect("failed to run setenv");
    assert!(!output.status.success());
}

#[test]
fn test_bin_wrong_password_exits_non_zero() {
    let dir = project();
    let set = setenv_cmd(dir.path())
        .args(["secrets", "set", "GLOBAL", "API_KEY", "--value", "abc123"])
        .env("SETENV_PASSWORD", "correct-horse")
        .output()
        .expect("failed to run setenv");
    assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));

    let get = setenv_cmd(dir.path())
        .args(["secrets", "get", "GLOBAL"])
        .env("SETENV_PASSWORD", "wrong-horse")
        .output()
        .expect("failed to run setenv");
    assert!(!get.status.success());
    let stderr = String::from_utf8_lossy(&get.stderr);
    assert!(stderr.contains("Invalid password"), "got: {}", stderr);
    let stdout = String::from_utf8_lossy(&get.stdout);
    assert!(!stdout.contains("abc123"));
}

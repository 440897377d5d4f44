//! End-to-end tests against the built binary.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Test context with an isolated installation root.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".alembic")
    }

    fn alembic_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_alembic");
        let mut cmd = Command::new(bin_path);
        cmd.env("ALEMBIC_ROOT", self.root());
        cmd
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .arg("--help")
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .arg("--version")
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
}

#[test]
fn test_plan_for_linux_stable() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .args(["--os", "linux", "plan"])
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run ./configure"));
    assert!(stdout.contains("--enable-utf8proc"));
    assert!(!stdout.contains("--with-TERM"));
}

#[test]
fn test_plan_json_is_machine_readable() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .args(["--os", "linux", "plan", "--json"])
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("plan --json must emit valid JSON");
    assert_eq!(value["variant"], "stable");
    assert!(value["plan"]["steps"].is_array());
}

#[test]
fn test_deps_respects_head_flag() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .args(["--os", "linux", "--head", "deps"])
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("autoconf (build)"));
    assert!(stdout.contains("bison (build)"));
}

#[test]
fn test_unknown_variant_fails_cleanly() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .args(["--os", "linux", "--variant", "nightly", "plan"])
        .output()
        .expect("failed to run alembic");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nightly"));
}

#[test]
fn test_macos_without_version_is_an_error() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .args(["--os", "macos", "plan"])
        .output()
        .expect("failed to run alembic");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OS version"));
}

#[test]
fn test_info_shows_caveats() {
    let ctx = TestContext::new();
    let output = ctx
        .alembic_cmd()
        .arg("info")
        .output()
        .expect("failed to run alembic");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tmux"));
    assert!(stdout.contains("Example configuration has been installed to:"));
}

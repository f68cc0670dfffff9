//! CLI integration tests.
//!
//! Spawns the `cdc-check` binary with `assert_cmd` and verifies exit codes,
//! stdout and stderr.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cdc_check() -> Command {
    cargo_bin_cmd!("cdc-check")
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

const VALID: &str = r#"
import Test

pub contract Registry {
    pub event Registered(address: Address, status: Test.ResultStatus)

    pub fun require(_ ok: Bool) {
        assert(ok, message: "not ok")
    }
}
"#;

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    cdc_check()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Checker for the bootstrap contract programs",
        ));
}

#[test]
fn version_exits_0() {
    cdc_check()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cdc-check"));
}

// ──────────────────────────────────────────────
// 2. core-events subcommand
// ──────────────────────────────────────────────

#[test]
fn core_events_text_summary() {
    cdc_check()
        .arg("core-events")
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked CoreEvents"))
        .stdout(predicate::str::contains("code hash: "))
        .stdout(predicate::str::contains("imports: Test"))
        .stdout(predicate::str::contains(
            "event CoreEvents.AccountCreated(address: Address)",
        ))
        .stdout(predicate::str::contains("status: Test.ResultStatus"));
}

#[test]
fn core_events_json_summary() {
    let output = cdc_check()
        .args(["--output", "json", "core-events"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["location"], "CoreEvents");
    assert_eq!(summary["code_hash"].as_str().map(str::len), Some(64));
    assert_eq!(summary["imports"], serde_json::json!(["Test"]));

    let composites = summary["composites"].as_array().unwrap();
    let executed = composites
        .iter()
        .find(|c| c["name"] == "CoreEvents.TransactionExecuted")
        .unwrap();
    assert_eq!(executed["kind"], "event");
    assert_eq!(executed["access"], "public");
    assert_eq!(executed["fields"][1]["type"], "Test.ResultStatus");
}

#[test]
fn core_events_quiet_prints_nothing() {
    cdc_check()
        .args(["--quiet", "core-events"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_valid_file_exits_0() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "registry.cdc", VALID);

    cdc_check()
        .args(["check", "--location", "Registry"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked Registry"))
        .stdout(predicate::str::contains("Registry.Registered"));
}

#[test]
fn check_missing_file_exits_1() {
    cdc_check()
        .args(["check", "does/not/exist.cdc"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn check_parse_error_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "broken.cdc", "pub contract Broken {");

    cdc_check()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("parse error"));
}

#[test]
fn check_unsupported_import_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "crypto.cdc", "import Crypto\npub contract C {}\n");

    cdc_check()
        .args(["check", "--location", "C"])
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("import not supported"));
}

#[test]
fn check_error_as_json() {
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "leak.cdc",
        "import Test\npub contract Leak {\n    pub fun leak(): String {\n        return Test.version\n    }\n}\n",
    );

    let output = cdc_check()
        .args(["--output", "json", "check", "--location", "Leak"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let error: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["kind"], "check");
    assert_eq!(error["location"], "Leak");
    assert_eq!(error["line"], 4);
    assert_eq!(error["count"], 1);
}

#[test]
fn access_mode_relaxes_missing_modifiers() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "loose.cdc", "contract Loose {\n    fun f() {}\n}\n");

    cdc_check()
        .args(["check", "--location", "Loose"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing access modifier"));

    cdc_check()
        .args(["check", "--location", "Loose", "--access-mode", "unrestricted"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn check_quiet_suppresses_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "broken.cdc", "pub contract Broken {");

    cdc_check()
        .args(["--quiet", "check"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

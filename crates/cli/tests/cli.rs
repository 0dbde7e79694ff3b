use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("nickel-bridge").unwrap();
    cmd.env_remove("NICKEL_BRIDGE_EXECUTABLE")
        .env_remove("NICKEL_BRIDGE_MAX_DEPTH")
        .env_remove("NICKEL_BRIDGE_TRAILING_BYTES");
    cmd
}

// Any existing executable gets past backend lookup; the tests below fail
// before it would be run
fn stand_in_executable() -> String {
    std::env::current_exe().unwrap().display().to_string()
}

#[test]
fn test_help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("eval"))
        .stdout(predicate::str::contains("file"));
}

#[test]
fn test_unknown_format_is_rejected() {
    cmd()
        .args(["eval", "1", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported output format 'xml'"));
}

#[test]
fn test_json_flag_conflicts_with_format() {
    cmd()
        .args(["eval", "1", "--format", "yaml", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.ncl");
    cmd()
        .arg("file")
        .arg(&missing)
        .args(["--nickel", &stand_in_executable()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"))
        .stderr(predicate::str::contains("absent.ncl"));
}

#[test]
fn test_bad_max_depth_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.ncl");
    fs::write(&file, "1").unwrap();
    cmd()
        .env("NICKEL_BRIDGE_MAX_DEPTH", "deep")
        .arg("file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("NICKEL_BRIDGE_MAX_DEPTH"));
}

#[cfg(not(feature = "linked"))]
#[test]
fn test_missing_executable_suggests_installing() {
    cmd()
        .args(["eval", "1", "--nickel", "/nonexistent/bin/nickel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"))
        .stderr(predicate::str::contains("install the Nickel CLI"));
}

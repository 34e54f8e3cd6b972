//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn wsdl20_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wsdl20"))
}

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_basic() {
    let output = Command::new(wsdl20_bin())
        .arg("inspect")
        .arg(fixture("calculator.wsdl"))
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("wsdl20 v"), "should show version");
    assert!(
        stdout.contains("Target Namespace: http://example.com/calculator"),
        "should show namespace"
    );
    assert!(stdout.contains("Interfaces: 1"), "should show interface count");
    assert!(stdout.contains("=== Services ==="), "should list services");
    assert!(
        stdout.contains("http://example.com/calculator/soap"),
        "should show endpoint address"
    );
}

#[test]
fn test_cli_inspect_json_output() {
    let output = Command::new(wsdl20_bin())
        .arg("inspect")
        .arg("--json")
        .arg(fixture("calculator.wsdl"))
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "inspect --json should succeed");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(json["targetNamespace"], "http://example.com/calculator");
    assert_eq!(json["interfaces"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        json["interfaces"][0]["operations"][0]["messages"][1]["messageLabel"],
        "Out"
    );
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_cli_inspect_missing_file() {
    let output = Command::new(wsdl20_bin())
        .arg("inspect")
        .arg(fixture("does-not-exist.wsdl"))
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "inspect should fail");
    assert!(stderr.contains("Error:"), "should print the error");
}

// ============================================================================
// Fragments Command Tests
// ============================================================================

#[test]
fn test_cli_fragments() {
    let output = Command::new(wsdl20_bin())
        .arg("fragments")
        .arg(fixture("calculator.wsdl"))
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "fragments should succeed");
    assert_eq!(stdout.lines().next(), Some("wsdl.description()"));
    assert!(stdout.contains("wsdl.interfaceOperation(Calculator/add)"));
    assert!(stdout.contains("wsdl.endpoint(CalculatorService/soap)"));
}

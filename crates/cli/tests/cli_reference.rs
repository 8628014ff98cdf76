//! CLI tests for the informational subcommands: explain and check-guides.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn mapshift_cmd() -> Command {
    Command::new(cargo::cargo_bin!("mapshift"))
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"))
}

#[test]
fn explain_json_has_id_and_explanation() {
    let output = mapshift_cmd()
        .args(["explain", "MS1201", "--output", "json"])
        .output()
        .expect("run mapshift");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "MS1201");
    assert!(json["explanation"].is_string(), "{json}");
}

#[test]
fn explain_unknown_id_is_null_not_an_error() {
    let output = mapshift_cmd()
        .args(["explain", "MS9999", "--output", "json"])
        .output()
        .expect("run mapshift");
    assert!(output.status.success());
    assert!(stdout_json(&output)["explanation"].is_null());
}

#[test]
fn explain_pretty_writes_to_stdout() {
    let output = mapshift_cmd()
        .args(["explain", "MS1001", "--output", "pretty"])
        .output()
        .expect("run mapshift");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("MS1001"));
}

#[test]
fn check_guides_reports_the_embedded_guides() {
    let output = mapshift_cmd()
        .args(["check-guides", "--output", "json"])
        .output()
        .expect("run mapshift");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["target"], "1.21.5");
    assert!(json["commands"].as_u64().unwrap_or(0) > 40, "{json}");
    let contexts: Vec<&str> = json["contexts"]
        .as_array()
        .expect("contexts array")
        .iter()
        .filter_map(|c| c.as_str())
        .collect();
    for context in ["entity", "block", "item_tag"] {
        assert!(contexts.contains(&context), "{contexts:?}");
    }
}

#[test]
fn check_guides_rejects_an_invalid_guide() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nbt.jsonc");
    // `Name` has no action, rename or remove.
    fs::write(&path, r#"{ "entity": { "tags": { "Name": { "max": 1202 } } } }"#).expect("write guide");
    let output = mapshift_cmd()
        .args(["check-guides", "--output", "json", "--nbt-guide"])
        .arg(&path)
        .output()
        .expect("run mapshift");
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["ok"], false);
}

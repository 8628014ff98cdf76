//! CLI regression tests for the migration subcommands and their JSON contract.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn mapshift_cmd() -> Command {
    Command::new(cargo::cargo_bin!("mapshift"))
}

fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write temp file");
    (dir, path.to_string_lossy().to_string())
}

fn run_json(args: &[&str]) -> (std::process::Output, serde_json::Value) {
    let output = mapshift_cmd()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run mapshift");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
    (output, json)
}

#[test]
fn command_json_reports_output_and_empty_diagnostics() {
    let (output, json) = run_json(&["--from", "1.12.2", "--to", "1.13", "command", "toggledownfall"]);
    assert!(output.status.success());
    assert_eq!(json["output"], "weather clear");
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
}

#[test]
fn unknown_commands_warn_without_failing() {
    let (output, json) = run_json(&["--from", "1.12.2", "command", "frobnicate @p"]);
    assert!(output.status.success(), "warnings must not fail the run");
    assert_eq!(json["output"], "frobnicate @p");
    assert_eq!(json["diagnostics"][0]["id"], "MS1001");
    assert_eq!(json["diagnostics"][0]["severity"], "warn");
}

#[test]
fn function_write_rewrites_the_file_in_place() {
    let (_dir, path) = write_temp("reward.mcfunction", "# reward\ngive @p wool 1 14\n");
    let (output, json) = run_json(&["--from", "1.12.2", "--to", "1.13", "function", &path, "--write"]);
    assert!(output.status.success());
    assert_eq!(json["status"], "migrated");
    let written = fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "# reward\ngive @p red_wool 1\n");

    // A second run has nothing left to change.
    let (_, json) = run_json(&["--from", "1.13", "--to", "1.13", "function", &path, "--write"]);
    assert_eq!(json["status"], "unchanged");
}

#[test]
fn function_without_write_prints_the_migrated_text() {
    let (_dir, path) = write_temp("rain.mcfunction", "toggledownfall\n");
    let output = mapshift_cmd()
        .args(["--from", "1.12.2", "--output", "pretty", "function", &path])
        .output()
        .expect("run mapshift");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "weather clear\n");
    assert_eq!(fs::read_to_string(&path).expect("read back"), "toggledownfall\n");
}

#[test]
fn snbt_migrates_riding_chains() {
    let (output, json) = run_json(&[
        "--from",
        "1.8",
        "--to",
        "1.13",
        "snbt",
        r#"{id:"Pig",Riding:{id:"Cow"}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(json["snbt"], r#"{id:"minecraft:cow",Passengers:[{id:"minecraft:pig"}]}"#);
}

#[test]
fn profile_supplies_versions() {
    let (_dir, path) = write_temp(
        "profile.json",
        r#"{ "name": "skyblock", "source_version": "1.12.2", "target_version": "1.13" }"#,
    );
    let (output, json) = run_json(&["--profile", &path, "command", "xp 30"]);
    assert!(output.status.success());
    assert_eq!(json["output"], "experience add @s 30 points");
}

#[test]
fn flags_override_the_profile() {
    let (_dir, path) = write_temp(
        "profile.json",
        r#"{ "name": "skyblock", "source_version": "1.13", "target_version": "1.13" }"#,
    );
    let (_, json) = run_json(&["--profile", &path, "--from", "1.12.2", "command", "toggledownfall"]);
    assert_eq!(json["output"], "weather clear");
}

#[test]
fn missing_source_version_is_an_error() {
    let output = mapshift_cmd()
        .args(["--output", "json", "command", "say hi"])
        .output()
        .expect("run mapshift");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--from"), "stderr: {stderr}");
}

#[test]
fn backwards_migration_is_rejected() {
    let output = mapshift_cmd()
        .args(["--from", "1.16", "--to", "1.12.2", "command", "say hi"])
        .output()
        .expect("run mapshift");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("forward-only"), "stderr: {stderr}");
}

#[test]
fn custom_command_guide_replaces_the_embedded_one() {
    let guide = r#"{
      // One custom root.
      "hello": { "mapping": {
        "output": ["say", "$who"],
        "args": { "who": { "type": "literal", "default": "world" } },
        "legend": { "who": 1 }
      } }
    }"#;
    let (_dir, path) = write_temp("commands.jsonc", guide);
    let (_, json) = run_json(&["--from", "1.12.2", "--command-guide", &path, "command", "hello"]);
    assert_eq!(json["output"], "say world");
}

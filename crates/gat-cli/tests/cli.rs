use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const NETWORK: &str = r#"
id: north
substations:
  - id: S_FR
    country: FR
    voltageLevels:
      - { id: VL_FR_400, nominalVoltage: 400 }
      - { id: VL_FR_225, nominalVoltage: 225 }
  - id: S_BE
    country: BE
    voltageLevels:
      - { id: VL_BE_400, nominalVoltage: 400 }
      - { id: VL_BE_225, nominalVoltage: 225 }
injections:
  - { id: GEN_FR, type: GENERATOR, voltageLevel: VL_FR_400 }
  - { id: GEN_BE, type: GENERATOR, voltageLevel: VL_BE_400 }
branches:
  - { id: LINE_400, type: LINE, voltageLevel1: VL_FR_400, voltageLevel2: VL_BE_400 }
  - { id: LINE_225, type: LINE, voltageLevel1: VL_FR_225, voltageLevel2: VL_BE_225 }
variants:
  - id: N-1
    disconnected:
      - { element: GEN_BE }
"#;

const FORM_ID: &str = "8f0a1c52-7f43-4c61-9a43-1f0f2f6f1a01";
const IDS_ID: &str = "8f0a1c52-7f43-4c61-9a43-1f0f2f6f1a02";
const UNKNOWN_ID: &str = "00000000-0000-4000-8000-000000000000";

const LISTS: &str = r#"
lists:
  - id: 8f0a1c52-7f43-4c61-9a43-1f0f2f6f1a01
    type: FORM
    equipmentType: LINE
    nominalVoltage1: { type: LESS_OR_EQUAL, value1: 225 }
  - id: 8f0a1c52-7f43-4c61-9a43-1f0f2f6f1a02
    type: IDENTIFIERS
    identifiers:
      - name: generators
        elementIds: [GEN_FR, GEN_BE]
      - name: ghosts
        elementIds: [NOWHERE]
"#;

/// Working directory with `networks/north.yaml` and `lists.yaml`; HOME points
/// inside it so no user configuration leaks into the run.
fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("networks")).unwrap();
    fs::write(dir.path().join("networks/north.yaml"), NETWORK).unwrap();
    fs::write(dir.path().join("lists.yaml"), LISTS).unwrap();
    dir
}

fn gat(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gat").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .args(["--log-level", "warn"]);
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_validate_lists_every_definition() {
    let dir = workspace();
    gat(dir.path())
        .args(["lists", "validate", "--lists", "lists.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LINE nominalVoltage1 <= 225"))
        .stdout(predicate::str::contains("2 contingency group(s)"))
        .stdout(predicate::str::contains("2 valid list(s)"));
}

#[test]
fn test_validate_rejects_invalid_definition() {
    let dir = workspace();
    fs::write(
        dir.path().join("bad.yaml"),
        "lists:\n  - type: IDENTIFIERS\n    identifiers: []\n",
    )
    .unwrap();
    gat(dir.path())
        .args(["lists", "validate", "--lists", "bad.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.yaml"));
}

#[test]
fn test_metadata_as_json() {
    let dir = workspace();
    let value = json_stdout(gat(dir.path()).args([
        "lists",
        "metadata",
        "--lists",
        "lists.yaml",
        "--format",
        "json",
    ]));
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], FORM_ID);
    assert_eq!(entries[0]["type"], "FORM");
    assert_eq!(entries[1]["type"], "IDENTIFIERS");
    assert!(entries[1]["modificationDate"].is_string());
}

#[test]
fn test_export_against_network_from_default_directory() {
    let dir = workspace();
    let value = json_stdout(gat(dir.path()).args([
        "lists",
        "export",
        "--lists",
        "lists.yaml",
        "--network",
        "north",
        "--id",
        FORM_ID,
        "--id",
        IDS_ID,
        "--id",
        UNKNOWN_ID,
        "--format",
        "json",
    ]));
    let ids: Vec<&str> = value["contingencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["LINE_225", "generators"]);
    assert_eq!(value["notFoundListIds"][0], UNKNOWN_ID);
}

#[test]
fn test_export_plain_reports_missing_lists() {
    let dir = workspace();
    gat(dir.path())
        .args([
            "lists",
            "export",
            "--lists",
            "lists.yaml",
            "--network",
            "north",
            "--id",
            UNKNOWN_ID,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("list not found: {UNKNOWN_ID}")));
}

#[test]
fn test_unknown_network_fails() {
    let dir = workspace();
    gat(dir.path())
        .args(["lists", "count", "--lists", "lists.yaml", "--network", "south"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("south"));
}

#[test]
fn test_count_uses_explicit_network_directory() {
    let dir = workspace();
    let elsewhere = tempdir().unwrap();
    gat(elsewhere.path())
        .args(["lists", "count", "--lists"])
        .arg(dir.path().join("lists.yaml"))
        .args(["--network", "north", "--network-dir"])
        .arg(dir.path().join("networks"))
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_inspect_reports_disconnected_elements_in_variant() {
    let dir = workspace();
    let value = json_stdout(gat(dir.path()).args([
        "lists",
        "inspect",
        "--lists",
        "lists.yaml",
        "--id",
        IDS_ID,
        "--network",
        "north",
        "--variant",
        "N-1",
        "--format",
        "json",
    ]));
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "generators");
    assert_eq!(results[0]["disconnectedElements"][0], "GEN_BE");
    assert!(results[1]["contingency"].is_null());
    assert_eq!(results[1]["notFoundElements"][0], "NOWHERE");
}

#[test]
fn test_configuration_file_supplies_defaults() {
    let dir = workspace();
    fs::write(
        dir.path().join("gat.toml"),
        "[evaluation]\ndefault_variant = \"N-1\"\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();
    let value = json_stdout(gat(dir.path()).args([
        "lists",
        "inspect",
        "--lists",
        "lists.yaml",
        "--id",
        IDS_ID,
        "--network",
        "north",
    ]));
    assert_eq!(value["results"][0]["disconnectedElements"][0], "GEN_BE");
}

#[test]
fn test_networks_list_and_inspect() {
    let dir = workspace();
    gat(dir.path())
        .args(["networks", "list"])
        .assert()
        .success()
        .stdout("north\n");

    gat(dir.path())
        .args(["networks", "inspect", "networks/north.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Network north"))
        .stdout(predicate::str::contains("N-1"));
}

#[test]
fn test_completions_are_generated() {
    let dir = workspace();
    gat(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gat"));
}

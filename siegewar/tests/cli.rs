// The cargo_bin! macro requires build script setup that's overkill for simple tests.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const SCENARIO: &str = r#"{
  "world": {
    "worlds": {
      "world": [
        { "coord": { "x": 0, "z": 0 }, "settlement": "Oakvale" },
        { "coord": { "x": 1, "z": 0 }, "settlement": "Oakvale" }
      ]
    },
    "settlements": {
      "Oakvale": { "name": "Oakvale" },
      "Ironhold": { "name": "Ironhold", "faction": "Northmark" }
    },
    "participants": {
      "alice": { "name": "alice", "settlement": "Ironhold" }
    },
    "sieges": {
      "Oakvale": {
        "defending_settlement": "Oakvale",
        "status": "in_progress",
        "zones": {
          "Northmark": {
            "attacking_faction": "Northmark",
            "defending_settlement": "Oakvale",
            "flag_location": { "world": "world", "x": 0.0, "y": 64.0, "z": -10.0 }
          }
        }
      }
    }
  },
  "placements": [
    {
      "player": { "name": "alice", "id": "a-1", "world": "world" },
      "block": { "type_key": "minecraft:chest", "position": { "world": "world", "x": 3, "y": 64, "z": 3 } }
    },
    {
      "player": { "name": "alice", "id": "a-1", "world": "world" },
      "block": { "type_key": "minecraft:white_banner", "position": { "world": "world", "x": 0, "y": 64, "z": -20 } }
    },
    {
      "player": { "name": "alice", "id": "a-1", "world": "world" },
      "block": { "type_key": "minecraft:stone", "position": { "world": "world", "x": 3, "y": 64, "z": 3 } }
    }
  ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_replay_prints_siege_actions() {
    let scenario = write_temp(SCENARIO);

    let output = Command::new(cargo_bin("siegewar"))
        .arg("--scenario")
        .arg(scenario.path())
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");
    assert!(lines[0].contains(r#""type":"plunder""#));
    assert!(lines[1].contains(r#""type":"abandon""#));
    assert!(lines[1].contains("northmark#vs#oakvale"));
}

#[test]
fn test_settings_file_disables_actions() {
    let scenario = write_temp(SCENARIO);
    let settings = write_temp(r#"{ "plunder_enabled": false, "abandon_enabled": false }"#);

    let output = Command::new(cargo_bin("siegewar"))
        .arg("--scenario")
        .arg(scenario.path())
        .arg("--settings")
        .arg(settings.path())
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_scenario_fails_with_path() {
    let output = Command::new(cargo_bin("siegewar"))
        .arg("--scenario")
        .arg("/nonexistent/scenario.json")
        .output()
        .expect("failed to execute process");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        predicate::str::contains("/nonexistent/scenario.json").eval(&stderr),
        "Stderr: {}",
        stderr
    );
}

fn assert_scenario_rejected(scenario: &str, expected: &str) {
    let file = write_temp(scenario);
    let output = Command::new(cargo_bin("siegewar"))
        .arg("--scenario")
        .arg(file.path())
        .output()
        .expect("failed to execute process");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        predicate::str::contains("Failed to parse scenario").eval(&stderr),
        "Stderr: {}",
        stderr
    );
    assert!(
        predicate::str::contains(expected).eval(&stderr),
        "Stderr: {}",
        stderr
    );
}

#[test]
fn test_scenario_with_ambiguous_zone_name_fails() {
    let scenario = SCENARIO.replace(
        r#""attacking_faction": "Northmark""#,
        r#""attacking_faction": "North#vs""#,
    );
    assert_scenario_rejected(&scenario, "north#vs#vs#oakvale");
}

#[test]
fn test_scenario_with_zone_under_wrong_key_fails() {
    let scenario = SCENARIO.replace(r#""Northmark": {"#, r#""Southreach": {"#);
    assert_scenario_rejected(&scenario, "Southreach");
}

#[test]
fn test_help_flag() {
    let output = Command::new(cargo_bin("siegewar"))
        .arg("--help")
        .output()
        .expect("failed to execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--scenario"));
}

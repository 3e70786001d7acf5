// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the pathyard CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// pathyard with colors and inherited config overrides switched off
fn pathyard() -> Command {
    let mut cmd = Command::cargo_bin("pathyard").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("PATHYARD_CONFIG");
    cmd
}

/// Parse JSON stdout and return its `data` payload
fn json_data(output: &std::process::Output) -> serde_json::Value {
    let text = String::from_utf8_lossy(&output.stdout);
    let mut value: serde_json::Value =
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON ({e}):\n{text}"));
    assert_eq!(value["tool"], "pathyard");
    value["data"].take()
}

#[test]
fn test_help_lists_commands() {
    pathyard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("all-paths"))
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn test_generate_is_deterministic() {
    let run = || {
        let output = pathyard()
            .args(["--json", "generate", "--nodes", "12", "--seed", "5"])
            .output()
            .unwrap();
        assert!(output.status.success());
        json_data(&output)
    };
    let first = run();
    let second = run();

    assert_eq!(first["graph"]["nodes"], 12);
    assert_eq!(first["graph"]["fingerprint"], second["graph"]["fingerprint"]);
    assert_eq!(first["edges"], second["edges"]);
}

#[test]
fn test_generate_writes_dot_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.dot");

    pathyard()
        .args(["generate", "-n", "6", "--format", "dot", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let dot = fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("digraph pathyard {"));
    assert!(dot.contains("->"));
}

#[test]
fn test_invalid_degree_is_rejected() {
    pathyard()
        .args(["generate", "--nodes", "4", "--degree-max", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("degree_max 4 exceeds N-1 = 3"));
}

#[test]
fn test_paths_text_reports_agreement() {
    pathyard()
        .args(["paths", "--nodes", "20", "--seed", "3", "--from", "0", "--to", "19", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bidirectional_dijkstra"))
        .stdout(predicate::str::contains("all algorithms agree"));
}

#[test]
fn test_paths_out_of_range_node_fails() {
    pathyard()
        .args(["paths", "--nodes", "5", "--to", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("node 7 is out of range"));
}

#[test]
fn test_metrics_json_has_every_key() {
    let output = pathyard()
        .args(["--json", "metrics", "--nodes", "15"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let data = json_data(&output);

    let metrics = data["metrics"].as_object().unwrap();
    assert_eq!(metrics.len(), 19);
    assert!(metrics.contains_key("pagerank_entropy"));
    assert!(metrics.contains_key("node_connectivity"));
}

#[test]
fn test_all_paths_respects_limit() {
    let output = pathyard()
        .args([
            "--json", "all-paths", "--nodes", "10", "--degree-min", "3", "--degree-max", "6",
            "--to", "9", "--max-depth", "6", "--limit", "3",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let data = json_data(&output);

    assert_eq!(data["status"], "complete");
    assert!(data["stats"]["n_paths"].as_u64().unwrap() <= 3);
}

#[test]
fn test_excessive_precision_is_rejected() {
    pathyard()
        .args(["generate", "--nodes", "6", "--degree-max", "3"])
        .env("PATHYARD__GENERATOR__PRECISION", "400")
        .assert()
        .failure()
        .stderr(predicate::str::contains("precision 400 exceeds the maximum"));
}

#[test]
fn test_all_paths_list_matches_count() {
    let output = pathyard()
        .args([
            "--json", "all-paths", "--nodes", "8", "--degree-min", "2", "--degree-max", "4",
            "--to", "7", "--max-depth", "4", "--list",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let data = json_data(&output);

    assert_eq!(data["status"], "complete");
    assert_eq!(
        data["paths"].as_array().map(|p| p.len() as u64),
        data["stats"]["n_paths"].as_u64()
    );
}

#[test]
fn test_all_paths_list_obeys_timeout() {
    let output = pathyard()
        .args([
            "--json", "all-paths", "--nodes", "14", "--degree-min", "13", "--degree-max", "13",
            "--to", "1", "--max-depth", "13", "--timeout-ms", "1", "--list",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let data = json_data(&output);

    assert_eq!(data["status"], "timed_out");
    assert!(data.get("paths").is_none());
}

#[test]
fn test_analyze_text_has_all_sections() {
    pathyard()
        .args(["analyze", "--nodes", "12", "--to", "11", "--max-depth", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shortest paths 0 -> 11"))
        .stdout(predicate::str::contains("Simple paths (max depth 3)"))
        .stdout(predicate::str::contains("Metrics"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pathyard.toml");
    fs::write(&path, "[generator]\nnodes = 9\nseed = 11\n").unwrap();

    let output = pathyard()
        .args(["--json", "generate"])
        .env("PATHYARD_CONFIG", &path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_data(&output)["graph"]["nodes"], 9);

    pathyard()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes = 9"));
}

#[test]
fn test_missing_config_file_fails() {
    pathyard()
        .args(["--config", "/nonexistent/pathyard.toml", "metrics"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    pathyard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pathyard"));
}

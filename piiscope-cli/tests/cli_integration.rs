//! Integration tests for the piiscope CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn piiscope() -> Command {
    let mut cmd = Command::cargo_bin("piiscope").unwrap();
    cmd.env_remove("PIISCOPE_CONFIG");
    cmd
}

#[test]
fn test_scan_text_output() {
    let mut cmd = piiscope();
    cmd.arg("scan").arg("-i").arg(fixture_path("sample.txt"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("email\t1.00\tbilling@northwind.example"))
        .stdout(predicate::str::contains("phone\t1.00\t555-123-4567"))
        .stdout(predicate::str::contains("date\t0.80\tJan 17, 2026"))
        .stdout(predicate::str::contains("properNoun\t1.00\tJohn Smith"))
        .stdout(predicate::str::contains("\t17\t").not());
}

#[test]
fn test_type_filter() {
    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-t")
        .arg("emails,ip");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("billing@northwind.example"))
        .stdout(predicate::str::contains("10.0.0.12"))
        .stdout(predicate::str::contains("555-123-4567").not())
        .stdout(predicate::str::contains("John Smith").not());
}

#[test]
fn test_json_output() {
    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-f")
        .arg("json")
        .arg("-t")
        .arg("money");

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let findings = value.as_array().unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["type"], "money");
    assert_eq!(findings[0]["text"], "$1,250.00");
    assert!(findings[0]["source"]
        .as_str()
        .unwrap()
        .ends_with("sample.txt"));
}

#[test]
fn test_markdown_output() {
    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-f")
        .arg("markdown");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("| Source | Type |"))
        .stdout(predicate::str::contains("---"))
        .stdout(predicate::str::contains("*Total findings:"));
}

#[test]
fn test_output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_file = temp_dir.path().join("report.txt");

    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-o")
        .arg(&output_file);

    cmd.assert().success().stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&output_file).unwrap();
    assert!(content.contains("billing@northwind.example"));
}

#[test]
fn test_glob_pattern_and_parallel() {
    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("*.txt"))
        .arg("--parallel")
        .arg("--threads")
        .arg("2")
        .arg("-q");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sample.txt"))
        .stdout(predicate::str::contains("plain.txt").not());
}

#[test]
fn test_threshold_flag() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("note.txt");
    fs::write(&input, "met Quorvia today").unwrap();

    let mut strict = piiscope();
    strict.arg("scan").arg("-i").arg(&input);
    strict
        .assert()
        .success()
        .stdout(predicate::str::contains("Quorvia").not());

    let mut lenient = piiscope();
    lenient
        .arg("scan")
        .arg("-i")
        .arg(&input)
        .arg("--threshold")
        .arg("0.5");
    lenient
        .assert()
        .success()
        .stdout(predicate::str::contains("Quorvia"));

    let mut invalid = piiscope();
    invalid
        .arg("scan")
        .arg("-i")
        .arg(&input)
        .arg("--threshold")
        .arg("2");
    invalid
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}

#[test]
fn test_debug_shows_signals() {
    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("--debug")
        .arg("-t")
        .arg("names");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("capitalization(+0.30)"));
}

#[test]
fn test_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("piiscope.toml");
    fs::write(
        &config,
        r#"
[detection.thresholds]
properNoun = 1.0

[output]
default_format = "json"
"#,
    )
    .unwrap();

    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-c")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"type\": \"email\""));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "[detection]\nproximity_window = 0\n").unwrap();

    let mut cmd = piiscope();
    cmd.arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-c")
        .arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("proximity_window"));
}

#[test]
fn test_invalid_file() {
    let mut cmd = piiscope();
    cmd.arg("scan").arg("-i").arg("nonexistent.txt");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_help_command() {
    let mut cmd = piiscope();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("generate-config"));
}

#[test]
fn test_list_types_and_formats() {
    piiscope()
        .arg("list")
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("properNoun"))
        .stdout(predicate::str::contains("creditCard"));

    piiscope()
        .arg("list")
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("markdown"));
}

#[test]
fn test_generate_config_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("generated.toml");

    piiscope()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success();

    piiscope()
        .arg("scan")
        .arg("-i")
        .arg(fixture_path("sample.txt"))
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("billing@northwind.example"));

    piiscope()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

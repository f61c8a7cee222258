use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPORT: &str = "EXPERIAN CREDIT REPORT
Prepared for JANE DOE

CAPITAL ONE 414709844770****
Account Type: Revolving
Balance: $0
Credit Limit: $25,000
Date Opened: 01/23/2013
Account Status: Current

PORTFOLIO RECOVERY 600012345678****
Account Type: Installment
Balance: $2,500
Date Opened: 03/01/2019
Account Status: Charge Off
";

/// Command with the config directory pointed into the temp dir.
fn tradeline(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tradeline").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

fn write_report(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, REPORT).unwrap();
    path
}

#[test]
fn process_text_report_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write_report(&dir, "report.txt");

    tradeline(dir.path())
        .args(["process", input.to_str().unwrap(), "--user-id", "user-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"creditor_name\": \"CAPITAL ONE\""))
        .stdout(predicate::str::contains("414709844770****"))
        .stdout(predicate::str::contains("\"credit_limit\": \"$25,000\""))
        .stdout(predicate::str::contains("\"user_id\": \"user-1\""));
}

#[test]
fn process_csv_with_validation() {
    let dir = TempDir::new().unwrap();
    let input = write_report(&dir, "report.txt");

    tradeline(dir.path())
        .args(["process", input.to_str().unwrap(), "--format", "csv", "--show-validation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("creditor_name"))
        .stdout(predicate::str::contains("confidence"))
        .stdout(predicate::str::contains("CAPITAL ONE"));
}

#[test]
fn process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_report(&dir, "report.txt");
    let output = dir.path().join("out.json");

    tradeline(dir.path())
        .args(["process", input.to_str().unwrap(), "--bureau", "transunion", "--output"])
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"credit_bureau\": \"TransUnion\""));
}

#[test]
fn process_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    tradeline(dir.path())
        .args(["process", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_unknown_bureau_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_report(&dir, "report.txt");

    tradeline(dir.path())
        .args(["process", input.to_str().unwrap(), "--bureau", "innovis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown credit bureau"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_report(&dir, "a.txt");
    write_report(&dir, "b.txt");
    let out_dir = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    tradeline(dir.path())
        .args(["batch", pattern.to_str().unwrap(), "--summary", "--output-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out_dir.join("a.json").exists());
    assert!(out_dir.join("b.json").exists());
    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains("a.txt,success,Experian,pre_extracted,2,1"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.pdf");

    tradeline(dir.path())
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    tradeline(dir.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    tradeline(dir.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();

    tradeline(dir.path())
        .args(["config", "set", "negative.threshold", "0.5"])
        .assert()
        .success();

    tradeline(dir.path())
        .args(["config", "get", "negative.threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5"));

    tradeline(dir.path())
        .args(["config", "set", "negative.nope", "1"])
        .assert()
        .failure();
}

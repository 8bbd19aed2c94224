//! Integration tests for the partext CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const THREE_RECORDS: &str = "A>rec1\nline\nA>rec2\nA>rec3\n";

fn partext() -> Command {
    Command::cargo_bin("partext").unwrap()
}

#[test]
fn test_split_stdin() {
    partext()
        .args(["split", "-q", "--pattern", "A>"])
        .write_stdin(THREE_RECORDS)
        .assert()
        .success()
        .stdout("A>rec1\nline\nA>rec2\nA>rec3\n");
}

#[test]
fn test_split_exclude() {
    partext()
        .args(["split", "-q", "-p", "A>", "--exclude", "rec2"])
        .write_stdin(THREE_RECORDS)
        .assert()
        .success()
        .stdout("A>rec1\nline\nA>rec3\n");
}

#[test]
fn test_split_range() {
    let input: String = (1..=10).map(|i| format!("<R>{i}\n")).collect();

    partext()
        .args(["split", "-q", "-p", "<R>", "--min", "4", "--max", "6"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("<R>4\n<R>5\n<R>6\n");
}

#[test]
fn test_split_many_workers_keeps_order() {
    let input: String = (1..=500).map(|i| format!("<R>{i}\nbody {i}\n")).collect();

    partext()
        .args(["split", "-q", "-p", "<R>", "-j", "8", "--heap-delay", "0"])
        .write_stdin(input.clone())
        .assert()
        .success()
        .stdout(input);
}

#[test]
fn test_split_ignore_case_and_transform() {
    partext()
        .args(["split", "-q", "-p", "a>", "-I", "-t", "lower"])
        .write_stdin("A>One\na>Two\n")
        .assert()
        .success()
        .stdout("a>one\na>two\n");
}

#[test]
fn test_split_non_utf8_round_trip() {
    let input = b"A>caf\xe9\n\xff\xfe\nA>two\n".to_vec();

    partext()
        .args(["split", "-q", "-p", "A>", "-j", "2"])
        .write_stdin(input.clone())
        .assert()
        .success()
        .stdout(input);
}

#[test]
fn test_split_whole_word() {
    partext()
        .args(["split", "-q", "-p", "cat", "--whole-word", "-f", "json"])
        .write_stdin("cat one\nconcat\ncat two\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"text\": \"cat one\\nconcat\\n\""))
        .stdout(predicate::str::contains("\"index\": 2"))
        .stdout(predicate::str::contains("\"index\": 3").not());
}

#[test]
fn test_split_json_output() {
    partext()
        .args(["split", "-q", "-p", "A>", "-f", "json"])
        .write_stdin(THREE_RECORDS)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"index\": 3"))
        .stdout(predicate::str::contains("\"text\": \"A>rec2\\n\""));
}

#[test]
fn test_split_files() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in.txt");
    let output = temp_dir.path().join("out.txt");
    fs::write(&input, THREE_RECORDS).unwrap();

    partext()
        .args(["split", "-q", "-p", "A>", "-r", "rec"])
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "A>rec1\nline\nA>rec2\nA>rec3\n"
    );
}

#[test]
fn test_split_without_pattern_fails() {
    partext()
        .args(["split", "-q"])
        .write_stdin(THREE_RECORDS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern is required"));
}

#[test]
fn test_split_missing_input_fails() {
    partext()
        .args(["split", "-q", "-p", "A>", "-i", "/nonexistent/input.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_generate_validate_and_split() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("partext.toml");

    partext()
        .args(["generate-config", "--pattern", "A>", "--output"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("generated successfully"));

    partext()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    partext()
        .args(["split", "-q", "--config"])
        .arg(&config)
        .write_stdin(THREE_RECORDS)
        .assert()
        .success()
        .stdout("A>rec1\nline\nA>rec2\nA>rec3\n");
}

#[test]
fn test_validate_reports_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("filtered.toml");
    fs::write(
        &config,
        "[partition]\npattern = \"A>\"\n\n[partition.filter]\nexclude = \"rec2\"\nmax = 5\n",
    )
    .unwrap();

    partext()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("exclude Some(\"rec2\")"))
        .stdout(predicate::str::contains("positions 0..=5"));

    partext()
        .args(["generate-config", "--output"])
        .arg(&config)
        .assert()
        .success();

    partext()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("every record is kept"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "[engine]\nread_size = 0\n").unwrap();

    partext()
        .args(["validate", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn test_help() {
    partext()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("generate-config"));
}

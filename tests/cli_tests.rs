//! Integration tests for the `json-transform` binary.
//!
//! These tests use `assert_cmd`, `predicates` and `tempfile` to run the binary
//! over file, directory and stdin input and check what it writes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

const GREETING: &str = "dst.greeting = src.observations[0].input[0]";

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn conversation(text: &str) -> String {
    json!({"observations": [{"input": [text]}]}).to_string()
}

#[test]
fn file_in_file_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    fs::write(&input, conversation("hello")).unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .arg(&input)
        .args(["-t", GREETING, "-o"])
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\n  \"messages\""));
    assert_eq!(
        read_json(&output),
        json!({"messages": ["hello"], "greeting": "hello"})
    );
}

#[test]
fn directory_in_directory_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("docs");
    let output = dir.path().join("results");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a.json"), conversation("first")).unwrap();
    fs::write(input.join("b.json"), r#"{"broken": true}"#).unwrap();
    fs::write(input.join("c.json"), conversation("third")).unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .arg(&input)
        .args(["-t", GREETING, "-o"])
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        read_json(&output.join("0.json")),
        json!({"messages": ["first"], "greeting": "first"})
    );
    assert_eq!(
        read_json(&output.join("1.json")),
        json!({"messages": ["third"], "greeting": "third"})
    );
    assert!(!output.join("2.json").exists());
}

#[test]
fn array_file_is_a_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("batch.json");
    let output = dir.path().join("all.json");
    fs::write(
        &input,
        format!("[{}, {}]", conversation("x"), conversation("y")),
    )
    .unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .arg(&input)
        .args(["-t", "dst.n = 1", "--compact", "-o"])
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(!written.contains('\n'));
    assert_eq!(
        read_json(&output),
        json!([{"messages": ["x"], "n": 1}, {"messages": ["y"], "n": 1}])
    );
}

#[test]
fn stdin_input_with_code_file() {
    let dir = tempfile::tempdir().unwrap();
    let code = dir.path().join("code.txt");
    let output = dir.path().join("out.json");
    fs::write(&code, "dst.name = src.name.upper()\n# comment\ndst.len = len(src.name)\n").unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", "dst.ignored = 1", "--no-reseed", "-f"])
        .arg(&code)
        .arg("-o")
        .arg(&output)
        .write_stdin(r#"{"name": "ada"}"#)
        .assert()
        .success();

    assert_eq!(read_json(&output), json!({"name": "ADA", "len": 3}));
}

#[test]
fn non_ascii_is_written_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", GREETING, "-o"])
        .arg(&output)
        .write_stdin(conversation("héllo"))
        .assert()
        .success();

    assert!(fs::read_to_string(&output).unwrap().contains("héllo"));
}

#[test]
fn compile_error_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", "dst.a = 1", "-t", "dst.b = (", "-o"])
        .arg(&output)
        .write_stdin(conversation("x"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("statement 1"));

    assert!(!output.exists());
}

#[test]
fn compile_error_reported_before_missing_input() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .arg(dir.path().join("missing.json"))
        .args(["-t", "dst.b = ("])
        .arg("-o")
        .arg(dir.path().join("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Compile error"))
        .stderr(predicate::str::contains("IO error").not());
}

#[test]
fn compact_keeps_directory_output_indented() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("batch.json");
    let output = dir.path().join("results");
    fs::write(&input, format!("[{}]", conversation("x"))).unwrap();

    Command::cargo_bin("json-transform")
        .unwrap()
        .arg(&input)
        .args(["-t", "dst.n = 1", "--compact", "-o"])
        .arg(&output)
        .assert()
        .success();

    let written = fs::read_to_string(output.join("0.json")).unwrap();
    assert!(written.contains("\n  \"messages\""));
}

#[test]
fn single_document_failure_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", "dst.a = 1", "-o"])
        .arg(&output)
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("reseed statement"));
}

#[test]
fn single_document_to_directory_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results");

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", GREETING, "-o"])
        .arg(&output)
        .write_stdin(conversation("x"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory path"));
}

#[test]
fn fail_fast_stops_batch() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");

    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", GREETING, "--fail-fast", "-o"])
        .arg(&output)
        .write_stdin(format!("[{}, {{}}]", conversation("x")))
        .assert()
        .failure();

    assert!(!output.exists());
}

#[test]
fn invalid_json_input() {
    Command::cargo_bin("json-transform")
        .unwrap()
        .args(["-t", GREETING])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}

//! End-to-end tests for the pagemark binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/data/document.json")
}

fn pagemark() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pagemark"))
}

#[test]
fn test_markdown_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.md");

    let status = pagemark()
        .arg("markdown")
        .arg(fixture())
        .arg("-o")
        .arg(&out)
        .arg("--separator")
        .arg("rule")
        .status()
        .unwrap();
    assert!(status.success());

    let markdown = fs::read_to_string(&out).unwrap();
    assert!(markdown.starts_with("# User Guide\n"));
    assert!(markdown.contains("\n---\n\n## Links\n"));
}

#[test]
fn test_markdown_to_stdout_with_pages() {
    let output = pagemark()
        .arg("md")
        .arg(fixture())
        .arg("--pages")
        .arg("2")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# Links\n"));
    assert!(!stdout.contains("User Guide"));
}

#[test]
fn test_check_reports_stable_pages() {
    let output = pagemark().arg("check").arg(fixture()).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 pages stable"));
}

#[test]
fn test_json_dump() {
    let output = pagemark()
        .arg("json")
        .arg(fixture())
        .arg("--compact")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"font_stats\""));
}

#[test]
fn test_unknown_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.txt");
    fs::write(&path, "%PDF-1.7").unwrap();

    let output = pagemark().arg("info").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown input format"));
}

#[test]
fn test_invalid_page_range_fails() {
    let output = pagemark()
        .arg("markdown")
        .arg(fixture())
        .arg("--pages")
        .arg("5-2")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

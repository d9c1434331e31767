//! genmap.rs
//!
//! Black-box tests of `zedmap genmap` against the fixtures under
//! `tests/fixtures` at the workspace root.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

fn zedmap() -> Command {
    let mut cmd = Command::cargo_bin("zedmap").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn writes_json_to_stdout_and_warnings_to_stderr() {
    let out = zedmap()
        .arg("genmap")
        .arg(fixture("docs.zed"))
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("{\n    \"entities\""));
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["schemaHash"].as_str().unwrap().len(), 64);
    assert_eq!(
        v["entities"]["document"]["relations"]["owner"]["downstreamPermissions"],
        serde_json::json!([
            {"entity": "document", "relation": "edit"},
            {"entity": "document", "relation": "read"}
        ])
    );
    assert_eq!(v["warnings"].as_array().unwrap().len(), 2);

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("zedmap parser generated 2 warnings while processing the schema:"));
    assert!(stderr.contains("* document->allowed: exclusions (- operator) are currently not supported"));
    assert!(stderr.contains("* document->restricted: intersections (& operator) are currently not supported"));
}

#[test]
fn quiet_suppresses_warnings() {
    zedmap()
        .arg("genmap")
        .arg("-q")
        .arg(fixture("docs.zed"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn no_warnings_no_header() {
    zedmap()
        .arg("genmap")
        .arg(fixture("chain.zed"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn output_extension_selects_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.yml");

    zedmap()
        .arg("genmap")
        .arg(fixture("chain.zed"))
        .arg("-o")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("schemaHash:"));
    assert!(text.contains("entities:\n  resource:\n"));
}

#[test]
fn explicit_format_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.yaml");

    zedmap()
        .args(["genmap", "-f", "json", "-o"])
        .arg(&path)
        .arg(fixture("chain.zed"))
        .assert()
        .success();

    let text = fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(v["entities"]["resource"].is_object());
}

#[test]
fn closure_resolution_flag() {
    let out = zedmap()
        .args(["genmap", "--resolution", "closure"])
        .arg(fixture("chain.zed"))
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let links = v["entities"]["resource"]["relations"]["base"]["downstreamPermissions"]
        .as_array()
        .unwrap()
        .len();
    assert_eq!(links, 4);
}

#[test]
fn unknown_format_fails() {
    zedmap()
        .args(["genmap", "-f", "toml"])
        .arg(fixture("chain.zed"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: toml"));
}

#[test]
fn missing_schema_fails() {
    zedmap()
        .args(["genmap", "does-not-exist.zed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error opening schema file [does-not-exist.zed]"));
}

#[test]
fn compile_error_fails() {
    zedmap()
        .arg("genmap")
        .arg(fixture("broken.zed"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error compiling schema [").and(
            predicate::str::contains("expected `:`, found `user`"),
        ))
        .stdout(predicate::str::is_empty());
}

#[test]
fn failed_write_prints_no_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    zedmap()
        .arg("genmap")
        .arg(fixture("docs.zed"))
        .arg("-o")
        .arg(blocker.join("map.json"))
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("error creating directory")
                .and(predicate::str::contains("warnings while processing").not()),
        );
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COUNTER_IDL: &str = r#"
    program Counter;
    type CounterError = enum { Overflow, Underflow };
    constructor {
        New : (initial: u32);
    };
    #[interface_id = 0x579d6daba41b7d82]
    service Counter {
        Add : (value: u32) -> u32;
        Sub : (value: u32) -> result (u32, CounterError);
        query Value : () -> u32;
    };
"#;

fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("counter.idl");
    std::fs::write(&path, COUNTER_IDL).unwrap();
    path
}

#[test]
fn test_parse_emits_document_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir);

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    let output = cmd.arg("parse").arg(&path).assert().success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["program"]["name"], "Counter");
    let services = json["services"].as_array().unwrap();
    assert_eq!(services[0]["name"], "Counter");
    let funcs = services[0]["funcs"].as_array().unwrap();
    assert_eq!(funcs.len(), 3);
    assert_eq!(funcs[0]["name"], "Add");
}

#[test]
fn test_types_resolves_service_scope() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir);

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    let output = cmd
        .arg("types")
        .arg(&path)
        .arg("--service")
        .arg("Counter")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let variants = json["CounterError"]["_enum"].as_array().unwrap();
    assert_eq!(variants[0], "Overflow");
    assert_eq!(variants[1], "Underflow");
}

#[test]
fn test_header_encode_decode_roundtrip() {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    let output = cmd
        .args([
            "header",
            "encode",
            "--interface-id",
            "0x579d6daba41b7d82",
            "--entry-id",
            "2",
            "--route-idx",
            "1",
        ])
        .assert()
        .success();
    let hex = String::from_utf8(output.get_output().stdout.clone())
        .unwrap()
        .trim()
        .to_string();
    assert_eq!(hex, "474d0110579d6daba41b7d8202000100");

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    let output = cmd.args(["header", "decode", &hex]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["interface_id"], "0x579d6daba41b7d82");
    assert_eq!(json["entry_id"], 2);
    assert_eq!(json["route_idx"], 1);
    assert_eq!(json["body_len"], 0);
}

#[test]
fn test_call_encodes_reference_payload() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir);

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    cmd.arg("call")
        .arg(&path)
        .args(["--service", "Counter"])
        .args(["--func", "Add"])
        .args(["--route-idx", "1"])
        .args(["--args-hex", "05000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "474d0110579d6daba41b7d820000010005000000",
        ));
}

#[test]
fn test_parse_reports_syntax_position() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.idl");
    std::fs::write(&path, "service { Add : (value u32); };").unwrap();

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    cmd.arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error at"));
}

#[test]
fn test_call_unknown_function_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir);

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mast").unwrap();
    cmd.arg("call")
        .arg(&path)
        .args(["--service", "Counter"])
        .args(["--func", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nope"));
}

//! Integration tests for CLI commands.

use serde_json::json;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn create_model(dir: &Path) -> String {
    write_json(
        dir,
        "model.json",
        &json!({
            "properties": [
                { "identifier": "target", "name": "Target", "mode": "rw",
                  "dataType": { "type": "int", "min": 5, "max": 30 } },
                { "identifier": "power", "name": "Power", "dataType": { "type": "bool" } }
            ],
            "events": [
                { "identifier": "overheat", "name": "Overheat", "type": "alert",
                  "params": [ { "identifier": "temperature", "dataType": { "type": "float" } } ] }
            ],
            "actions": [
                { "identifier": "move", "name": "Move",
                  "input": [
                      { "identifier": "speed", "dataType": { "type": "int" } },
                      { "identifier": "direction", "dataType": { "type": "string" } }
                  ],
                  "output": [ { "identifier": "ok", "dataType": { "type": "bool" } } ] }
            ]
        }),
    )
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "thingcheck", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

#[test]
fn test_verify_property_table() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "req.json",
        &json!({ "method": "report", "params": { "target": "21", "humidity": 40 } }),
    );

    let (success, stdout, _) = run_cli(&["verify", &model, "property", &req]);
    assert!(success);
    assert!(stdout.contains("IDENTIFIER"));
    assert!(stdout.contains("target"));
    assert!(!stdout.contains("humidity"));
    assert!(stdout.contains("1 of 2 fields verified"));
}

#[test]
fn test_verify_json_output() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "req.json",
        &json!({ "method": "eventPost", "eventID": "overheat", "params": { "temperature": 90 } }),
    );

    let (success, stdout, _) = run_cli(&["verify", &model, "event", &req, "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["event_type"], "alert");
    assert_eq!(value["params"]["temperature"]["value"], 90.0);
}

#[test]
fn test_verify_missing_action_param_fails() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "req.json",
        &json!({ "method": "action", "actionID": "move", "params": { "speed": 10 } }),
    );

    let (success, _, stderr) = run_cli(&["verify", &model, "action-input", &req]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("direction"));
}

#[test]
fn test_action_output_params_flag() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "reply.json",
        &json!({ "method": "actionReply", "actionID": "move", "params": { "ok": true } }),
    );

    let (success, _, _) = run_cli(&["verify", &model, "action-output", &req]);
    assert!(!success);

    let (success, stdout, _) = run_cli(&[
        "verify",
        &model,
        "action-output",
        &req,
        "--action-output-params",
        "output",
    ]);
    assert!(success);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_options_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let options = write_json(dir.path(), "options.json", &json!({ "actionOutputParams": "output" }));
    let req = write_json(
        dir.path(),
        "reply.json",
        &json!({ "method": "actionReply", "actionID": "move", "params": { "ok": 1 } }),
    );

    let (success, _, _) = run_cli(&[
        "verify",
        &model,
        "action-output",
        &req,
        "--options",
        &options,
    ]);
    assert!(success);
}

#[test]
fn test_batch_fails_whole() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "pack.json",
        &json!({
            "method": "packReport",
            "properties": [
                { "timestamp": 1700000000000i64, "params": { "target": 10 } },
                { "timestamp": 1700000001000i64, "params": { "target": 99 } },
                { "timestamp": 1700000002000i64, "params": { "target": 12 } }
            ]
        }),
    );

    let (success, stdout, stderr) = run_cli(&["batch", &model, &req]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("target"));
}

#[test]
fn test_batch_json_output() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let req = write_json(
        dir.path(),
        "pack.json",
        &json!({
            "method": "packReport",
            "properties": [ { "timestamp": 1, "params": { "target": 10 } } ],
            "events": [ { "timestamp": 2, "eventID": "overheat", "params": { "temperature": 70 } } ]
        }),
    );

    let (success, stdout, _) = run_cli(&["batch", &model, &req, "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["properties"][0]["timestamp"], 1);
    assert_eq!(value["events"][0]["eventID"], "overheat");
    assert_eq!(value["events"][0]["type"], "alert");
}

#[test]
fn test_ingest_envelope() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    // base64 of {"method":"report","params":{"power":0}}
    let envelope = write_json(
        dir.path(),
        "publish.json",
        &json!({
            "topic": "$thing/up/property/p1/d1",
            "timestamp": 1700000000000i64,
            "productID": "p1",
            "deviceName": "d1",
            "handle": "thing",
            "type": "property",
            "payload": "eyJtZXRob2QiOiJyZXBvcnQiLCJwYXJhbXMiOnsicG93ZXIiOjB9fQ==",
            "protocolCode": "iThings"
        }),
    );

    let (success, stdout, _) = run_cli(&["ingest", &model, &envelope]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["params"]["power"], false);
}

#[test]
fn test_ingest_unroutable_envelope() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let envelope = write_json(
        dir.path(),
        "publish.json",
        &json!({
            "productID": "p1",
            "deviceName": "d1",
            "handle": "ota",
            "type": "upgrade",
            "payload": "e30="
        }),
    );

    let (success, _, stderr) = run_cli(&["ingest", &model, &envelope]);
    assert!(!success);
    assert!(stderr.contains("unroutable"));
}

#[test]
fn test_ingest_connection_notice() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());
    let notice = write_json(
        dir.path(),
        "conn.json",
        &json!({
            "username": "d1",
            "timestamp": 1700000000000i64,
            "addr": "10.0.0.7:5123",
            "clientID": "p1&d1",
            "reason": "",
            "action": "connected",
            "productID": "p1",
            "deviceName": "d1"
        }),
    );

    let (success, stdout, _) = run_cli(&["ingest", &model, &notice]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["action"], "connected");
    assert_eq!(value["clientID"], "p1&d1");
}

#[test]
fn test_inspect_lists_definitions() {
    let dir = TempDir::new().unwrap();
    let model = create_model(dir.path());

    let (success, stdout, _) = run_cli(&["inspect", &model]);
    assert!(success);
    assert!(stdout.contains("KIND"));
    assert!(stdout.contains("overheat"));
    assert!(stdout.contains("1 in") || stdout.contains("2 in"));
}

#[test]
fn test_invalid_model_is_reported() {
    let dir = TempDir::new().unwrap();
    let model = write_json(
        dir.path(),
        "model.json",
        &json!({ "properties": [
            { "identifier": "a", "dataType": { "type": "int" } },
            { "identifier": "a", "dataType": { "type": "int" } }
        ] }),
    );

    let (success, _, stderr) = run_cli(&["inspect", &model]);
    assert!(!success);
    assert!(stderr.contains("duplicate property identifier"));
}

#[test]
fn test_token_sequence() {
    let (success, stdout, _) = run_cli(&["token", "--node-id", "26", "--count", "3"]);
    assert!(success);
    let tokens: Vec<&str> = stdout.lines().collect();
    assert_eq!(tokens, vec!["0011a", "0021a", "0031a"]);
}

//! Integration tests for the index command

#![allow(deprecated)]

use predicates::prelude::*;
use tempfile::TempDir;

mod common;
use common::{generate_store, read_json, synergy_cmd};

#[test]
fn test_index_postings() {
    let temp = TempDir::new().unwrap();
    let (_, tags) = generate_store(temp.path());
    let index = temp.path().join("index.json");

    synergy_cmd()
        .arg("index")
        .arg(&tags)
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 6 cards (effective source)"));

    let value = read_json(&index);
    assert_eq!(
        value["byProduces"]["KO:Cost<=5"],
        serde_json::json!(["OP01-010"])
    );
    assert_eq!(
        value["byRequires"]["NeedsDON:>=2"],
        serde_json::json!(["OP02-030"])
    );
    assert_eq!(value["meta"]["source"], "effective");
    assert_eq!(value["meta"]["cards"], 6);

    let text = std::fs::read_to_string(&index).unwrap();
    assert!(!text.contains("_p1"));
}

#[test]
fn test_index_manual_source() {
    let temp = TempDir::new().unwrap();
    let (_, tags) = generate_store(temp.path());
    let index = temp.path().join("index.json");

    synergy_cmd()
        .arg("tag")
        .arg(&tags)
        .arg("OP01-001")
        .arg("--add")
        .arg("produces=DON:AddActive:+1")
        .assert()
        .success();

    synergy_cmd()
        .arg("index")
        .arg(&tags)
        .arg(&index)
        .arg("--source")
        .arg("manual")
        .assert()
        .success();

    let value = read_json(&index);
    assert_eq!(
        value["byProduces"],
        serde_json::json!({"DON:AddActive:+1": ["OP01-001"]})
    );
}

#[test]
fn test_index_invalid_source() {
    let temp = TempDir::new().unwrap();
    let (_, tags) = generate_store(temp.path());

    synergy_cmd()
        .arg("index")
        .arg(&tags)
        .arg(temp.path().join("index.json"))
        .arg("--source")
        .arg("sideways")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid source"));
}

#[test]
fn test_index_missing_store() {
    let temp = TempDir::new().unwrap();

    synergy_cmd()
        .arg("index")
        .arg(temp.path().join("nope.json"))
        .arg(temp.path().join("index.json"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("synergy tags"));
}

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn synergy_cmd() -> Command {
    let mut cmd = Command::cargo_bin("synergy").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A small card database covering the cost, DON and leader-trait ladders
pub const CARDS: &str = r#"{
  "OP01-001": {
    "name": "Monkey.D.Luffy",
    "text": "",
    "cardType": "LEADER",
    "color": ["Red"],
    "category": ["Straw Hat Crew"],
    "attribute": "Strike",
    "trigger": null
  },
  "OP01-010": {
    "name": "Gum-Gum Red Hawk",
    "text": "[Main] K.O. up to 1 of your opponent's Characters with a cost of 5 or less.",
    "cardType": "EVENT",
    "cost": 2,
    "color": ["Red"],
    "category": ["Straw Hat Crew"],
    "trigger": null
  },
  "OP01-020": {
    "name": "Nami",
    "text": "[On Play] Reduce the cost of 1 of your Characters by 5 until the end of this turn.",
    "cardType": "CHARACTER",
    "cost": "3",
    "power": "5000",
    "color": ["Red"],
    "category": ["Straw Hat Crew"],
    "attribute": "Special"
  },
  "OP01-020_p1": {
    "name": "Nami",
    "text": "[On Play] Reduce the cost of 1 of your Characters by 5 until the end of this turn.",
    "cardType": "CHARACTER",
    "cost": "3",
    "color": ["Red"],
    "category": ["Straw Hat Crew"]
  },
  "OP02-030": {
    "name": "Smoker",
    "text": "[DON!! x2] [When Attacking] Draw 1 card.",
    "cardType": "CHARACTER",
    "cost": 2,
    "color": ["Green"],
    "category": ["Navy"]
  },
  "OP02-040": {
    "name": "Tashigi",
    "text": "[On Play] Add up to 1 DON!! card from your DON!! deck and set it as active.",
    "cardType": "CHARACTER",
    "cost": 4,
    "color": ["Green"],
    "category": ["Navy"]
  },
  "OP02-050": {
    "name": "Hina",
    "text": "[DON!! x1] If your Leader has the {Navy} type, draw 1 card.",
    "cardType": "CHARACTER",
    "cost": 5,
    "color": ["Green"],
    "category": ["Navy"]
  }
}"#;

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Write the fixture database and generate a tag store next to it
pub fn generate_store(dir: &Path) -> (PathBuf, PathBuf) {
    let cards = write_file(dir, "cards.json", CARDS);
    let tags = dir.join("tags.json");
    synergy_cmd()
        .arg("tags")
        .arg(&cards)
        .arg(&tags)
        .assert()
        .success();
    (cards, tags)
}

//! Integration tests for the multiversal binary.
//!
//! Spawns the adjudicator process on JSON files written to the temp
//! directory and checks the worlds and summaries it prints.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_multiversal"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to start multiversal")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "multiversal failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// A scratch file unique to this test process.
fn scratch(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("multiversal-{}-{name}.json", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn location(region: &str) -> Value {
    json!({"timeline": 1, "year": 1901, "phase": "Spring", "regionId": region})
}

/// The starting world with France ordering Paris to Burgundy.
fn world_with_move() -> Value {
    let mut world = stdout_json(&run(&["new"]));
    world["orders"] = json!([{
        "type": "Move",
        "unit": {"owner": "France", "type": "Army"},
        "location": location("Par"),
        "destination": location("Bur"),
    }]);
    world
}

#[test]
fn new_prints_the_starting_world() {
    let world = stdout_json(&run(&["new"]));
    assert_eq!(world["iteration"], 0);
    let boards = world["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["units"].as_array().unwrap().len(), 22);
    assert_eq!(boards[0]["centres"].as_array().unwrap().len(), 34);
}

#[test]
fn adjudicate_advances_the_world() {
    let input = scratch("adjudicate", &world_with_move().to_string());
    let world = stdout_json(&run(&["adjudicate", input.to_str().unwrap(), "--seed", "1"]));
    fs::remove_file(&input).ok();

    assert_eq!(world["iteration"], 1);
    let boards = world["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 2);
    let fall = &boards[1];
    assert_eq!(fall["phase"], "Fall");
    assert!(fall["units"]
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["regionId"] == "Bur" && u["owner"] == "France"));

    let orders = world["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 22);
    assert_eq!(orders[0]["status"], "Success");
}

#[test]
fn saved_game_replays() {
    let input = scratch("to-save", &world_with_move().to_string());
    let played = run(&["adjudicate", input.to_str().unwrap()]);
    fs::remove_file(&input).ok();
    let played = scratch("played", &stdout_json(&played).to_string());

    let save = stdout_json(&run(&["save", played.to_str().unwrap()]));
    fs::remove_file(&played).ok();
    assert_eq!(save["iteration"], 1);
    assert_eq!(save["hasStrictAdjacencies"], false);
    let save = scratch("save", &save.to_string());

    let output = run(&["replay", save.to_str().unwrap(), "--seed", "3"]);
    fs::remove_file(&save).ok();
    assert!(output.status.success());
    let summary = String::from_utf8(output.stdout).unwrap();
    assert!(summary.contains("iteration 1, 2 boards, winner none"), "{summary}");
}

#[test]
fn unknown_region_is_reported() {
    let mut world = world_with_move();
    world["orders"][0]["destination"]["regionId"] = json!("Atlantis");
    let input = scratch("unknown-region", &world.to_string());
    let output = run(&["adjudicate", input.to_str().unwrap()]);
    fs::remove_file(&input).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown region Atlantis"));
}

#[test]
fn unknown_command_fails() {
    let output = run(&["teleport"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: multiversal"));
}

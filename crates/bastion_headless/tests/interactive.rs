//! JSON-lines sessions driven from memory.

use std::io::Cursor;

use bastion_core::prelude::*;
use bastion_headless::runner::{HeadlessConfig, HeadlessRunner};
use bastion_test_utils::fixtures::{arena, attacker};
use serde_json::Value;

fn session(runner: &mut HeadlessRunner, script: &str) -> Vec<Value> {
    let mut output = Vec::new();
    runner.run(Cursor::new(script), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn build_then_battle_over_the_wire() {
    let mut runner = HeadlessRunner::new(
        Match::new(MatchConfig::default(), Difficulty::Medium, 5),
        HeadlessConfig::default(),
    );
    let script = r#"
{"cmd":"place","kind":"Barracks","col":4,"row":5}
{"cmd":"select","id":38}
{"cmd":"fund","amount":60}
{"cmd":"advance"}
{"cmd":"tick","count":10}
{"cmd":"hash"}
{"cmd":"quit"}
{"cmd":"tick","count":10}
"#;
    let lines = session(&mut runner, script);

    let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec![
            "ready",
            "accepted",
            "accepted",
            "accepted",
            "accepted",
            "ticked",
            "state_hash",
            "bye",
        ]
    );
    assert_eq!(lines[1]["outcome"]["Placed"], 38);
    assert_eq!(lines[3]["outcome"]["Funded"]["reserve"], 60);
    assert_eq!(lines[4]["outcome"]["BattleStarted"]["attackers"], 7);
    assert_eq!(lines[5]["tick"], 10);
    // Nothing after quit is read.
    assert_eq!(runner.game().current_tick(), 10);
    assert_eq!(lines[6]["hash"], runner.game().state_hash());
    assert_eq!(runner.game().gold(), 400 - 100 - 60);
}

#[test]
fn bad_lines_and_rejections_are_reported() {
    let mut runner = HeadlessRunner::new(arena(), HeadlessConfig::default());
    let script = "not json\n\n{\"cmd\":\"repair\"}\n{\"cmd\":\"select\",\"id\":999}\n";
    let lines = session(&mut runner, script);

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1]["type"], "error");
    assert!(lines[1]["cmd"].is_null());
    assert_eq!(lines[2]["type"], "error");
    assert_eq!(lines[2]["cmd"], "repair");
    assert_eq!(lines[2]["message"], "No structure selected");
    assert_eq!(lines[3]["cmd"], "select");
}

#[test]
fn game_over_is_announced_once() {
    let mut game = arena();
    attacker(&mut game, UnitArchetype::Giant, 300, 384);
    let config = HeadlessConfig {
        auto_state_output: true,
        ..HeadlessConfig::default()
    };
    let mut runner = HeadlessRunner::new(game, config);

    let lines = session(
        &mut runner,
        "{\"cmd\":\"tick\",\"count\":20000}\n{\"cmd\":\"tick\",\"count\":5}\n",
    );
    let over: Vec<&Value> = lines.iter().filter(|l| l["type"] == "game_over").collect();
    assert_eq!(over.len(), 1);
    assert_eq!(over[0]["result"], "lost");

    // The state dump that follows each tick shows the wrecked command center.
    let state = lines.iter().rfind(|l| l["type"] == "state").unwrap();
    assert_eq!(state["structures"][0]["kind"], "command_center");
    assert_eq!(state["structures"][0]["health"]["current"], 0);
    assert_eq!(state["phase"], "Lost");
    assert_eq!(state["units"][0]["kind"], "giant");
    assert_eq!(state["units"][0]["allegiance"], "Attacker");
}

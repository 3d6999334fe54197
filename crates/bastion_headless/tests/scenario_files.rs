//! Scenario files on disk: the shipped ones and round trips through tempfiles.

use std::path::PathBuf;

use bastion_core::prelude::*;
use bastion_headless::scenario::{Scenario, ScenarioError};
use bastion_headless::{run_game, GameConfig, MatchOutcome};

fn scenarios_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

#[test]
fn shipped_scenarios_parse_and_run() {
    let mut found = 0;
    for entry in std::fs::read_dir(scenarios_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("ron") {
            continue;
        }
        let scenario = Scenario::load(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let result = run_game(&GameConfig::new(scenario).with_max_ticks(300), None);
        assert_eq!(
            result.metrics.rejected_commands,
            0,
            "{} has rejected commands",
            path.display()
        );
        found += 1;
    }
    assert!(found >= 3);
}

#[test]
fn fortified_file_matches_builtin_plan() {
    let file = Scenario::load(scenarios_dir().join("fortified.ron")).unwrap();
    assert_eq!(file.build_plan, Scenario::fortified().build_plan);
    assert_eq!(file.difficulty, Difficulty::Easy);
}

#[test]
fn giant_rush_overrides_config() {
    let scenario = Scenario::load(scenarios_dir().join("giant_rush.ron")).unwrap();
    let config = scenario.match_config();
    assert!(!config.perimeter_walls);
    assert_eq!(config.waves.len(), 2);
    assert_eq!(config.barracks.hire_cost, 10);

    let game = scenario.build_match(scenario.seed);
    assert_eq!(game.gold(), 600);
    assert_eq!(game.structures().len(), 1);
}

#[test]
fn save_and_load_through_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.ron");

    let mut scenario = Scenario::standard(Difficulty::Hard);
    scenario.name = "custom".to_string();
    scenario.starting_gold = Some(999);
    scenario.save(&path).unwrap();

    let loaded = Scenario::load(&path).unwrap();
    assert_eq!(loaded, scenario);
    assert_eq!(Scenario::resolve(path.to_str().unwrap()).unwrap(), scenario);
}

#[test]
fn load_errors_are_typed() {
    let dir = tempfile::tempdir().unwrap();

    let missing = Scenario::load(dir.path().join("nope.ron")).unwrap_err();
    assert!(matches!(missing, ScenarioError::FileNotFound(_)));

    let broken = dir.path().join("broken.ron");
    std::fs::write(&broken, "(name: \"broken\", difficulty: Impossible)").unwrap();
    assert!(matches!(
        Scenario::load(&broken).unwrap_err(),
        ScenarioError::ParseError(_)
    ));

    let invalid = dir.path().join("invalid.ron");
    std::fs::write(&invalid, "(name: \"invalid\", max_ticks: 0)").unwrap();
    assert!(matches!(
        Scenario::load(&invalid).unwrap_err(),
        ScenarioError::Invalid { .. }
    ));
}

#[test]
fn undefended_hard_match_is_lost() {
    let scenario = Scenario::standard(Difficulty::Hard);
    let result = run_game(&GameConfig::new(scenario).with_seed(3), None);
    assert_eq!(result.metrics.outcome, MatchOutcome::Lost);
    assert_eq!(result.metrics.command_center_health, 0);
    assert!(result.metrics.walls_breached > 0);
    assert_eq!(result.final_state.phase(), MatchPhase::Lost);
}

//! Scenario loading and configuration.
//!
//! A scenario pins down everything a headless match needs: difficulty,
//! seed, tick length, an optional [`MatchConfig`] override and a scripted
//! build plan of player commands keyed by tick.

use std::path::Path;

use bastion_core::commands::PlayerCommand;
use bastion_core::components::GridCell;
use bastion_core::config::{Difficulty, MatchConfig};
use bastion_core::simulation::{Match, DEFAULT_TICK_MS};
use bastion_core::structures::StructureKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to write RON.
    #[error("Failed to serialize scenario: {0}")]
    SerializeError(#[from] ron::Error),
    /// Parsed fine but cannot be run.
    #[error("Invalid scenario '{name}': {reason}")]
    Invalid {
        /// Scenario name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A player command scheduled for a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCommand {
    /// Applied before this tick runs.
    pub at_tick: u64,
    /// Command to apply.
    pub command: PlayerCommand,
}

impl PlannedCommand {
    /// Schedule `command` before tick `at_tick`.
    #[must_use]
    pub const fn new(at_tick: u64, command: PlayerCommand) -> Self {
        Self { at_tick, command }
    }
}

fn default_max_ticks() -> u64 {
    // 10 minutes of game time at the default step
    37_500
}

fn default_tick_ms() -> u32 {
    DEFAULT_TICK_MS
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Difficulty.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Seed for the wave generator.
    #[serde(default)]
    pub seed: u64,
    /// Give up after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Milliseconds of game time per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u32,
    /// Replaces the default match configuration.
    #[serde(default)]
    pub config: Option<MatchConfig>,
    /// Replaces the difficulty's starting gold.
    #[serde(default)]
    pub starting_gold: Option<u32>,
    /// Scripted player commands.
    #[serde(default)]
    pub build_plan: Vec<PlannedCommand>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::standard(Difficulty::Medium)
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ScenarioError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Write to a RON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Resolve a built-in name or a path to a RON file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        match Self::builtin(name_or_path) {
            Some(scenario) => Ok(scenario),
            None => Self::load(name_or_path),
        }
    }

    /// Built-in scenarios by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard(Difficulty::Medium)),
            "standard_easy" => Some(Self::standard(Difficulty::Easy)),
            "standard_hard" => Some(Self::standard(Difficulty::Hard)),
            "fortified" => Some(Self::fortified()),
            _ => None,
        }
    }

    /// Default layout, no player input: the walls and the command center
    /// hold out alone.
    #[must_use]
    pub fn standard(difficulty: Difficulty) -> Self {
        Self {
            name: "standard".to_string(),
            description: "Perimeter walls only, no player input".to_string(),
            difficulty,
            seed: 0,
            max_ticks: default_max_ticks(),
            tick_ms: DEFAULT_TICK_MS,
            config: None,
            starting_gold: None,
            build_plan: Vec::new(),
        }
    }

    /// A barracks funded in two installments behind an inner wall line.
    #[must_use]
    pub fn fortified() -> Self {
        let place = |kind, col, row| PlayerCommand::PlaceStructure {
            kind,
            cell: GridCell::new(col, row),
        };
        let mut build_plan = vec![
            PlannedCommand::new(0, place(StructureKind::Barracks, 4, 5)),
            PlannedCommand::new(0, place(StructureKind::GoldMine, 10, 6)),
        ];
        build_plan.extend(
            (4..=7).map(|row| PlannedCommand::new(0, place(StructureKind::Wall, 3, row))),
        );
        // Ids 1..=37 belong to the command center and the perimeter walls.
        build_plan.extend([
            PlannedCommand::new(1, PlayerCommand::SelectStructure(38.into())),
            PlannedCommand::new(1, PlayerCommand::FundStructure { amount: 40 }),
            PlannedCommand::new(1, PlayerCommand::AdvanceBuildPhase),
            PlannedCommand::new(1_000, PlayerCommand::SelectStructure(38.into())),
            PlannedCommand::new(1_000, PlayerCommand::FundStructure { amount: 40 }),
        ]);

        Self {
            name: "fortified".to_string(),
            description: "Barracks and a mine behind an inner wall".to_string(),
            difficulty: Difficulty::Easy,
            build_plan,
            ..Self::standard(Difficulty::Easy)
        }
    }

    /// Reject scenarios that cannot run.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: &str| ScenarioError::Invalid {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms must be positive"));
        }
        if self.max_ticks == 0 {
            return Err(invalid("max_ticks must be positive"));
        }
        if let Some(config) = &self.config {
            if config.cell_size == 0 || config.map_width == 0 || config.map_height == 0 {
                return Err(invalid("map and cell dimensions must be positive"));
            }
            if 2 * config.border >= config.map_width.min(config.map_height) {
                return Err(invalid("border leaves no build area"));
            }
        }
        Ok(())
    }

    /// Effective configuration.
    #[must_use]
    pub fn match_config(&self) -> MatchConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Fresh match for this scenario with `seed`.
    #[must_use]
    pub fn build_match(&self, seed: u64) -> Match {
        let game = Match::new(self.match_config(), self.difficulty, seed);
        match self.starting_gold {
            Some(gold) => game.with_gold(gold),
            None => game,
        }
    }

    /// Build plan in application order: by tick, then as written.
    #[must_use]
    pub fn ordered_plan(&self) -> Vec<PlannedCommand> {
        let mut plan = self.build_plan.clone();
        plan.sort_by_key(|planned| planned.at_tick);
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::components::StructureId;

    #[test]
    fn test_minimal_ron() {
        let scenario = Scenario::from_ron_str(r#"(name: "bare")"#).unwrap();
        assert_eq!(scenario.name, "bare");
        assert_eq!(scenario.difficulty, Difficulty::Medium);
        assert_eq!(scenario.tick_ms, DEFAULT_TICK_MS);
        assert!(scenario.build_plan.is_empty());
        assert_eq!(scenario.match_config(), MatchConfig::default());
    }

    #[test]
    fn test_partial_config_override() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "short",
                difficulty: Hard,
                starting_gold: Some(1000),
                config: Some((build_time_ms: 500, perimeter_walls: false)),
                build_plan: [
                    (at_tick: 0, command: PlaceStructure(kind: Wall, cell: (col: 4, row: 4))),
                ],
            )"#,
        )
        .unwrap();
        let config = scenario.match_config();
        assert_eq!(config.build_time_ms, 500);
        assert!(!config.perimeter_walls);
        assert_eq!(config.map_width, 1024);

        let game = scenario.build_match(1);
        assert_eq!(game.gold(), 1000);
        assert_eq!(game.structures().len(), 1);
    }

    #[test]
    fn test_invalid_tick_length() {
        let err = Scenario::from_ron_str(r#"(name: "stuck", tick_ms: 0)"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = Scenario::from_ron_str("(name: 12").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_builtins_validate() {
        for name in ["standard", "standard_easy", "standard_hard", "fortified"] {
            let scenario = Scenario::builtin(name).unwrap();
            scenario.validate().unwrap();
        }
        assert!(Scenario::builtin("nope").is_none());
    }

    #[test]
    fn test_fortified_selects_its_barracks() {
        let scenario = Scenario::fortified();
        let mut game = scenario.build_match(0);
        let first = game.apply_command(scenario.build_plan[0].command).unwrap();
        assert_eq!(
            first,
            bastion_core::commands::CommandOutcome::Placed(StructureId(38))
        );
    }

    #[test]
    fn test_ordered_plan_is_stable() {
        let mut scenario = Scenario::standard(Difficulty::Easy);
        scenario.build_plan = vec![
            PlannedCommand::new(5, PlayerCommand::AdvanceBuildPhase),
            PlannedCommand::new(0, PlayerCommand::CancelSelection),
            PlannedCommand::new(5, PlayerCommand::RepairStructure),
        ];
        let ticks: Vec<_> = scenario
            .ordered_plan()
            .iter()
            .map(|planned| (planned.at_tick, planned.command))
            .collect();
        assert_eq!(
            ticks,
            vec![
                (0, PlayerCommand::CancelSelection),
                (5, PlayerCommand::AdvanceBuildPhase),
                (5, PlayerCommand::RepairStructure),
            ]
        );
    }

    #[test]
    fn test_ron_roundtrip_preserves_plan() {
        let scenario = Scenario::fortified();
        let text = scenario.to_ron_string().unwrap();
        assert_eq!(Scenario::from_ron_str(&text).unwrap(), scenario);
    }
}

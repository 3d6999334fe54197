//! Match metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches the [`TickEvents`] of one match and folds
//! them into a [`GameMetrics`] record; [`BatchSummary`] aggregates many.

use std::collections::BTreeMap;

use bastion_core::combat::DamageEvent;
use bastion_core::commands::CommandOutcome;
use bastion_core::components::{Allegiance, TargetRef, UnitId};
use bastion_core::config::Difficulty;
use bastion_core::error::Result;
use bastion_core::simulation::{Match, MatchPhase, TickEvents};
use serde::{Deserialize, Serialize};

/// How a headless match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Every wave cleared.
    Won,
    /// Command center destroyed.
    Lost,
    /// Tick limit reached first.
    Timeout,
}

impl MatchOutcome {
    /// Outcome for a match that stopped in `phase`.
    #[must_use]
    pub const fn from_phase(phase: MatchPhase) -> Self {
        match phase {
            MatchPhase::Won => Self::Won,
            MatchPhase::Lost => Self::Lost,
            MatchPhase::Build | MatchPhase::Battle => Self::Timeout,
        }
    }
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Seed used.
    pub seed: u64,
    /// Difficulty.
    pub difficulty: Difficulty,
    /// How it ended.
    pub outcome: MatchOutcome,
    /// Ticks simulated.
    pub duration_ticks: u64,
    /// Tick the battle began, if it did.
    pub battle_start_tick: Option<u64>,
    /// Waves released.
    pub waves_launched: u32,
    /// Attackers spawned by waves.
    pub attackers_spawned: u32,
    /// Attackers removed from the field.
    pub attackers_removed: u32,
    /// Defenders trained by barracks.
    pub defenders_spawned: u32,
    /// Defenders removed from the field.
    pub defenders_lost: u32,
    /// Walls that fell.
    pub walls_breached: u32,
    /// Damage dealt by attackers.
    pub attacker_damage: u64,
    /// Damage dealt by defenders.
    pub defender_damage: u64,
    /// Damage absorbed by structures.
    pub structure_damage_taken: u64,
    /// Gold credited by mines.
    pub gold_generated: u64,
    /// Gold in the pool at the end.
    pub final_gold: u32,
    /// Command center health at the end.
    pub command_center_health: u32,
    /// Scripted commands that were rejected.
    pub rejected_commands: u32,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

/// Folds tick events into [`GameMetrics`].
///
/// Deaths are reported after the sweep has already removed the unit, so the
/// collector remembers each unit's side from the moment it is seen.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: GameMetrics,
    sides: BTreeMap<UnitId, Allegiance>,
}

impl MetricsCollector {
    /// Start collecting for `game`.
    #[must_use]
    pub fn new(scenario: impl Into<String>, seed: u64, game: &Match) -> Self {
        let sides = game
            .units()
            .values()
            .map(|unit| (unit.id, unit.allegiance))
            .collect();
        Self {
            metrics: GameMetrics {
                scenario: scenario.into(),
                seed,
                difficulty: game.difficulty(),
                outcome: MatchOutcome::Timeout,
                duration_ticks: 0,
                battle_start_tick: None,
                waves_launched: 0,
                attackers_spawned: 0,
                attackers_removed: 0,
                defenders_spawned: 0,
                defenders_lost: 0,
                walls_breached: 0,
                attacker_damage: 0,
                defender_damage: 0,
                structure_damage_taken: 0,
                gold_generated: 0,
                final_gold: game.gold(),
                command_center_health: 0,
                rejected_commands: 0,
                final_state_hash: 0,
            },
            sides,
        }
    }

    /// Fold the result of a player command.
    ///
    /// Starting the battle releases the first wave outside any tick, so its
    /// units are picked up here.
    pub fn record_command(&mut self, game: &Match, result: &Result<CommandOutcome>) {
        match result {
            Err(_) => self.metrics.rejected_commands += 1,
            Ok(CommandOutcome::BattleStarted { .. }) => {
                self.metrics.battle_start_tick = Some(game.current_tick());
                let fresh: Vec<UnitId> = game
                    .units()
                    .values()
                    .map(|unit| unit.id)
                    .filter(|id| !self.sides.contains_key(id))
                    .collect();
                self.record_spawns(game, &fresh);
            }
            Ok(_) => {}
        }
    }

    fn record_spawns(&mut self, game: &Match, spawned: &[UnitId]) {
        for &id in spawned {
            let Some(unit) = game.unit(id) else {
                continue;
            };
            self.sides.insert(id, unit.allegiance);
            match unit.allegiance {
                Allegiance::Attacker => self.metrics.attackers_spawned += 1,
                Allegiance::Defender => self.metrics.defenders_spawned += 1,
            }
        }
    }

    /// Fold one tick. `game` is the state after the tick.
    pub fn observe(&mut self, game: &Match, events: &TickEvents) {
        for hit in &events.damage {
            self.record_hit(hit);
        }
        for id in &events.deaths {
            match self.sides.remove(id) {
                Some(Allegiance::Attacker) => self.metrics.attackers_removed += 1,
                Some(Allegiance::Defender) => self.metrics.defenders_lost += 1,
                None => {}
            }
        }
        self.record_spawns(game, &events.spawned);
        self.metrics.walls_breached += events.breached.len() as u32;
        self.metrics.gold_generated += u64::from(events.gold_generated);
        if events.phase_change == Some(MatchPhase::Battle) {
            self.metrics.battle_start_tick = Some(game.current_tick());
        }
    }

    fn record_hit(&mut self, hit: &DamageEvent) {
        let damage = u64::from(hit.damage);
        match self.sides.get(&hit.attacker) {
            Some(Allegiance::Attacker) => self.metrics.attacker_damage += damage,
            Some(Allegiance::Defender) => self.metrics.defender_damage += damage,
            None => {}
        }
        if matches!(hit.target, TargetRef::Structure(_)) {
            self.metrics.structure_damage_taken += damage;
        }
    }

    /// Close the record against the final state.
    #[must_use]
    pub fn finish(mut self, game: &Match) -> GameMetrics {
        self.metrics.outcome = MatchOutcome::from_phase(game.phase());
        self.metrics.duration_ticks = game.current_tick();
        self.metrics.waves_launched = game.waves_launched();
        self.metrics.final_gold = game.gold();
        self.metrics.command_center_health =
            game.command_center().map_or(0, |cc| cc.health.current);
        self.metrics.final_state_hash = game.state_hash();
        self.metrics
    }
}

/// Aggregate over a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches counted.
    pub total_games: u32,
    /// Share of matches won.
    pub win_rate: f64,
    /// Share of matches lost.
    pub loss_rate: f64,
    /// Share of matches that hit the tick limit.
    pub timeout_rate: f64,
    /// Mean match length in ticks.
    pub avg_duration_ticks: f64,
    /// Mean waves released.
    pub avg_waves_launched: f64,
    /// Mean walls breached.
    pub avg_walls_breached: f64,
    /// Mean command center health left.
    pub avg_command_center_health: f64,
    /// Tick of the quickest loss.
    pub fastest_loss_ticks: Option<u64>,
}

impl BatchSummary {
    /// Summarize `games`.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let n = games.len() as f64;
        let share = |outcome| games.iter().filter(|g| g.outcome == outcome).count() as f64 / n;
        let mean = |f: fn(&GameMetrics) -> f64| games.iter().map(f).sum::<f64>() / n;

        Self {
            total_games: games.len() as u32,
            win_rate: share(MatchOutcome::Won),
            loss_rate: share(MatchOutcome::Lost),
            timeout_rate: share(MatchOutcome::Timeout),
            avg_duration_ticks: mean(|g| g.duration_ticks as f64),
            avg_waves_launched: mean(|g| f64::from(g.waves_launched)),
            avg_walls_breached: mean(|g| f64::from(g.walls_breached)),
            avg_command_center_health: mean(|g| f64::from(g.command_center_health)),
            fastest_loss_ticks: games
                .iter()
                .filter(|g| g.outcome == MatchOutcome::Lost)
                .map(|g| g.duration_ticks)
                .min(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::commands::PlayerCommand;
    use bastion_core::config::MatchConfig;
    use bastion_core::simulation::DEFAULT_TICK_MS;

    fn sample(outcome: MatchOutcome, duration_ticks: u64) -> GameMetrics {
        let game = Match::new(MatchConfig::default(), Difficulty::Easy, 0);
        let mut metrics = MetricsCollector::new("sample", 0, &game).finish(&game);
        metrics.outcome = outcome;
        metrics.duration_ticks = duration_ticks;
        metrics
    }

    #[test]
    fn test_outcome_from_phase() {
        assert_eq!(MatchOutcome::from_phase(MatchPhase::Won), MatchOutcome::Won);
        assert_eq!(MatchOutcome::from_phase(MatchPhase::Lost), MatchOutcome::Lost);
        assert_eq!(
            MatchOutcome::from_phase(MatchPhase::Battle),
            MatchOutcome::Timeout
        );
    }

    #[test]
    fn test_collector_counts_sides() {
        let mut game = Match::new(MatchConfig::default(), Difficulty::Easy, 7);
        let mut collector = MetricsCollector::new("t", 7, &game);

        let mut battle_started = false;
        for _ in 0..400 {
            let events = game.tick(DEFAULT_TICK_MS);
            battle_started |= events.phase_change == Some(MatchPhase::Battle);
            collector.observe(&game, &events);
        }
        let metrics = collector.finish(&game);

        assert!(battle_started);
        assert_eq!(metrics.attackers_spawned, 6);
        assert_eq!(metrics.waves_launched, 1);
        assert_eq!(metrics.defenders_spawned, 0);
        assert_eq!(metrics.battle_start_tick, Some(188));
        assert_eq!(metrics.final_state_hash, game.state_hash());
        assert_eq!(metrics.outcome, MatchOutcome::Timeout);
    }

    #[test]
    fn test_commands_are_folded() {
        let mut game = Match::new(MatchConfig::default(), Difficulty::Hard, 2);
        let mut collector = MetricsCollector::new("t", 2, &game);

        let rejected = game.apply_command(PlayerCommand::RepairStructure);
        collector.record_command(&game, &rejected);
        let started = game.apply_command(PlayerCommand::AdvanceBuildPhase);
        collector.record_command(&game, &started);

        let metrics = collector.finish(&game);
        assert_eq!(metrics.rejected_commands, 1);
        assert_eq!(metrics.attackers_spawned, 9);
        assert_eq!(metrics.battle_start_tick, Some(0));
    }

    #[test]
    fn test_summary_rates() {
        let games = vec![
            sample(MatchOutcome::Won, 100),
            sample(MatchOutcome::Lost, 300),
            sample(MatchOutcome::Lost, 200),
            sample(MatchOutcome::Timeout, 400),
        ];
        let summary = BatchSummary::from_games(&games);
        assert_eq!(summary.total_games, 4);
        assert!((summary.win_rate - 0.25).abs() < f64::EPSILON);
        assert!((summary.loss_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.avg_duration_ticks - 250.0).abs() < f64::EPSILON);
        assert_eq!(summary.fastest_loss_ticks, Some(200));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_games(&[]), BatchSummary::default());
    }
}

//! Test fixtures and helpers.
//!
//! Hand-built matches for scenario tests. An "arena" has only the command
//! center: no perimeter walls, no waves and a build phase that never ends,
//! so every unit and structure in it was put there by the test.

use bastion_core::components::{Allegiance, StructureId, UnitId};
use bastion_core::config::{Difficulty, MatchConfig};
use bastion_core::math::Vec2Fixed;
use bastion_core::simulation::{Match, DEFAULT_TICK_MS};
use bastion_core::structures::StructureKind;
use bastion_core::units::{StatOverrides, UnitArchetype};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Shorthand for an integer position.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Config for an arena: default stats, nothing scheduled.
#[must_use]
pub fn arena_config() -> MatchConfig {
    MatchConfig {
        perimeter_walls: false,
        build_time_ms: u32::MAX,
        waves: Vec::new(),
        ..MatchConfig::default()
    }
}

/// A match holding only the command center (top-left `(448, 320)`,
/// center `(512, 384)`).
#[must_use]
pub fn arena() -> Match {
    Match::new(arena_config(), Difficulty::Easy, 0)
}

/// A standard match with the walled layout.
#[must_use]
pub fn standard_match(difficulty: Difficulty, seed: u64) -> Match {
    Match::new(MatchConfig::default(), difficulty, seed)
}

/// Spawn an attacker with default stats.
pub fn attacker(game: &mut Match, archetype: UnitArchetype, x: i32, y: i32) -> UnitId {
    game.spawn_unit(
        archetype,
        Allegiance::Attacker,
        pos(x, y),
        StatOverrides::default(),
    )
}

/// Spawn a defender with default stats.
pub fn defender(game: &mut Match, archetype: UnitArchetype, x: i32, y: i32) -> UnitId {
    game.spawn_unit(
        archetype,
        Allegiance::Defender,
        pos(x, y),
        StatOverrides::default(),
    )
}

/// Insert a structure with its top-left corner at `(x, y)`, free of charge.
pub fn structure(game: &mut Match, kind: StructureKind, x: i32, y: i32) -> StructureId {
    game.spawn_structure(kind, pos(x, y))
}

/// Insert a wall already at zero health.
pub fn breached_wall(game: &mut Match, x: i32, y: i32) -> StructureId {
    let id = structure(game, StructureKind::Wall, x, y);
    // Freshly inserted, so the lookup cannot fail.
    let _ = game.set_structure_health(id, 0);
    id
}

/// Tick `n` times at the default step.
pub fn run_ticks(game: &mut Match, n: u32) {
    for _ in 0..n {
        game.tick(DEFAULT_TICK_MS);
    }
}

/// Tick until `done` holds or `limit` ticks pass. Returns the ticks used,
/// or `None` on timeout.
pub fn run_until(game: &mut Match, limit: u32, mut done: impl FnMut(&Match) -> bool) -> Option<u32> {
    for n in 0..limit {
        if done(game) {
            return Some(n);
        }
        game.tick(DEFAULT_TICK_MS);
    }
    done(game).then_some(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_is_bare() {
        let game = arena();
        assert_eq!(game.structures().len(), 1);
        assert!(game.units().is_empty());
        assert_eq!(
            game.command_center().map(|cc| cc.center()),
            Some(pos(512, 384))
        );
    }

    #[test]
    fn test_breached_wall_fixture() {
        let mut game = arena();
        let wall = breached_wall(&mut game, 192, 192);
        assert!(game.structure(wall).unwrap().is_breached_wall());
    }

    #[test]
    fn test_run_until_counts_ticks() {
        let mut game = arena();
        let used = run_until(&mut game, 100, |g| g.current_tick() >= 10);
        assert_eq!(used, Some(10));
        assert_eq!(run_until(&mut game, 5, |_| false), None);
    }
}

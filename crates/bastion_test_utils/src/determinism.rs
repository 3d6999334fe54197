//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! A match must be reproducible from its seed and command script alone.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: different CPUs can round differently.
//!   All positions and distances use [`bastion_core::math::Fixed`].
//!
//! - **Iteration order**: entity storage is ordered by id, and ids are
//!   handed out in insertion order.
//!
//! - **Randomness**: wave composition and spawn points come from the
//!   match's own seeded RNG, never from the system.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual module behavior (combat, targeting, ...)
//! 2. **Property tests**: random command scripts still replay identically
//! 3. **Integration tests**: full matches are reproducible
//! 4. **Parallel tests**: N matches run on N threads all agree

use std::thread;

use bastion_core::commands::PlayerCommand;
use bastion_core::simulation::{Match, DEFAULT_TICK_MS};
use tracing::warn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine several times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of runs
/// * `ticks` - Steps per run
/// * `setup` - Builds the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Hashes the final state
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a match twice from the same setup and compare state hashes.
pub fn verify_match_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Match,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |game| {
            game.tick(DEFAULT_TICK_MS);
        },
        Match::state_hash,
    )
    .is_deterministic
}

/// Replay a scripted match: each `(tick, command)` is applied before that
/// tick runs. Rejected commands are ignored, as a player's would be.
pub fn replay_script(mut game: Match, script: &[(u64, PlayerCommand)], num_ticks: u64) -> Match {
    let mut pending = script.iter().peekable();
    for tick in 0..num_ticks {
        while let Some((_, command)) = pending.next_if(|(at, _)| *at <= tick) {
            let _ = game.apply_command(*command);
        }
        game.tick(DEFAULT_TICK_MS);
    }
    game
}

/// Result of parallel match runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each match.
    pub hashes: Vec<u64>,
    /// Ticks each match ran.
    pub ticks: u64,
    /// Number of matches run.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all matches produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all matches agreed.
    ///
    /// # Panics
    ///
    /// Panics if matches produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            panic!(
                "Parallel matches diverged!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 All hashes: {:?}",
                self.num_runs, self.ticks, self.hashes
            );
        }
    }
}

/// Run N matches on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under different thread
/// scheduling or memory layout.
pub fn run_parallel_matches_scoped<F>(setup_fn: F, num_runs: usize, num_ticks: u64) -> ParallelRunResult
where
    F: Fn() -> Match + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    for _ in 0..num_ticks {
                        game.tick(DEFAULT_TICK_MS);
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(hash) => hash,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    ParallelRunResult {
        hashes,
        ticks: num_ticks,
        num_runs,
    }
}

/// Step two matches side by side and report the first tick at which their
/// hashes differ, or `None` if they never do.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        warn!("Matches differ before the first tick");
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick(DEFAULT_TICK_MS);
        second.tick(DEFAULT_TICK_MS);
        if first.state_hash() != second.state_hash() {
            warn!(tick, "Matches diverged");
            return Some(tick);
        }
    }
    None
}

/// Snapshot a match after `num_ticks`, restore it, and check the copy both
/// hashes the same and stays in lockstep for `follow_ticks` more ticks.
pub fn verify_snapshot_determinism<F>(setup_fn: F, num_ticks: u64, follow_ticks: u64) -> bool
where
    F: Fn() -> Match,
{
    let mut original = setup_fn();
    for _ in 0..num_ticks {
        original.tick(DEFAULT_TICK_MS);
    }

    let Ok(bytes) = original.serialize() else {
        return false;
    };
    let Ok(mut restored) = Match::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != original.state_hash() {
        return false;
    }

    for _ in 0..follow_ticks {
        original.tick(DEFAULT_TICK_MS);
        restored.tick(DEFAULT_TICK_MS);
    }
    restored.state_hash() == original.state_hash()
}

/// Proptest strategies for geometry and match inputs.
pub mod strategies {
    use bastion_core::commands::PlayerCommand;
    use bastion_core::components::{GridCell, StructureId};
    use bastion_core::config::Difficulty;
    use bastion_core::geometry::Rect;
    use bastion_core::math::{Fixed, Vec2Fixed};
    use bastion_core::structures::StructureKind;
    use bastion_core::units::UnitArchetype;
    use proptest::prelude::*;

    /// A coordinate on the default map, in quarter units.
    pub fn arb_coordinate(max: i32) -> impl Strategy<Value = Fixed> {
        (0..=max * 4).prop_map(|q| Fixed::from_num(q) / Fixed::from_num(4))
    }

    /// A point on the default 1024x768 map.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(1024), arb_coordinate(768)).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// A segment, possibly degenerate.
    pub fn arb_segment() -> impl Strategy<Value = (Vec2Fixed, Vec2Fixed)> {
        (arb_position(), arb_position())
    }

    /// A non-empty rectangle on the map.
    pub fn arb_rect() -> impl Strategy<Value = Rect> {
        (0i32..900, 0i32..700, 1i32..128, 1i32..128)
            .prop_map(|(x, y, w, h)| Rect::from_ints(x, y, w, h))
    }

    /// Any difficulty.
    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Medium),
            Just(Difficulty::Hard),
        ]
    }

    /// Any archetype.
    pub fn arb_archetype() -> impl Strategy<Value = UnitArchetype> {
        prop::sample::select(UnitArchetype::ALL.to_vec())
    }

    /// Any structure kind, including the non-placeable command center.
    pub fn arb_structure_kind() -> impl Strategy<Value = StructureKind> {
        prop_oneof![
            Just(StructureKind::CommandCenter),
            Just(StructureKind::Barracks),
            Just(StructureKind::GoldMine),
            Just(StructureKind::Wall),
        ]
    }

    /// A cell on or just off the default grid (16x12).
    pub fn arb_cell() -> impl Strategy<Value = GridCell> {
        (-1i32..17, -1i32..13).prop_map(|(col, row)| GridCell::new(col, row))
    }

    /// Any player command. Structure ids cover the default layout and a
    /// few placements beyond it.
    pub fn arb_command() -> impl Strategy<Value = PlayerCommand> {
        prop_oneof![
            4 => (arb_structure_kind(), arb_cell())
                .prop_map(|(kind, cell)| PlayerCommand::PlaceStructure { kind, cell }),
            3 => (1u32..60).prop_map(|id| PlayerCommand::SelectStructure(StructureId(id))),
            1 => Just(PlayerCommand::CancelSelection),
            2 => (0u32..300).prop_map(|amount| PlayerCommand::FundStructure { amount }),
            2 => Just(PlayerCommand::RepairStructure),
            1 => Just(PlayerCommand::AdvanceBuildPhase),
        ]
    }

    /// A script of commands with non-decreasing tick stamps.
    pub fn arb_command_script(max_len: usize, max_tick: u64) -> impl Strategy<Value = Vec<(u64, PlayerCommand)>> {
        proptest::collection::vec((0..max_tick, arb_command()), 0..max_len).prop_map(|mut script| {
            script.sort_by_key(|(tick, _)| *tick);
            script
        })
    }
}

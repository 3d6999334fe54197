//! The match: state owner and fixed-order tick loop.
//!
//! Each tick runs, in order:
//! 1. **Phase update** - build timer, wave schedule, win check
//! 2. **Structures** - barracks production, gold mine payouts
//! 3. **Units** - plan, move or attack, one unit at a time over an id snapshot
//! 4. **Sweep** - remove units that died this tick
//!
//! # Determinism
//!
//! - All positions and distances are fixed-point ([`Fixed`](crate::math::Fixed))
//! - Collections iterate in id order, which is insertion order
//! - Wave randomness comes from the seeded [`WaveRng`] stored in the match
//!
//! Two matches built from the same config, difficulty and seed that receive
//! the same commands at the same ticks produce the same [`Match::state_hash`].
//!
//! # Example
//!
//! ```
//! use bastion_core::prelude::*;
//!
//! let mut game = Match::new(MatchConfig::default(), Difficulty::Easy, 7);
//! game.apply_command(PlayerCommand::AdvanceBuildPhase).unwrap();
//! let events = game.tick(DEFAULT_TICK_MS);
//! assert_eq!(game.phase(), MatchPhase::Battle);
//! assert!(events.damage.is_empty());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::combat::{try_attack, DamageEvent};
use crate::components::{Allegiance, StructureId, TargetRef, UnitId};
use crate::config::{Difficulty, MatchConfig};
use crate::economy::Treasury;
use crate::error::{GameError, Result};
use crate::geometry::Rect;
use crate::math::Vec2Fixed;
use crate::navigation::{next_position, plan, UnitAction};
use crate::placement::check_placement;
use crate::structures::{PassiveContext, PassiveOutcome, Structure, StructureKind};
use crate::units::{Commitment, StatOverrides, Unit, UnitArchetype};
use crate::waves::{plan_wave, spawn_point, WaveRng};
use crate::world::{StructureStorage, UnitStorage, WorldView};

/// Default simulation step in milliseconds.
pub const DEFAULT_TICK_MS: u32 = 16;

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Player places structures; the build timer runs.
    Build,
    /// Waves attack.
    Battle,
    /// Every wave cleared.
    Won,
    /// Command center destroyed.
    Lost,
}

impl MatchPhase {
    /// Won or lost.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Everything notable that happened during one tick.
///
/// Consumed by the headless runner for metrics and by any presentation
/// layer for effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Hits that landed, in resolution order.
    pub damage: Vec<DamageEvent>,
    /// Units removed by the end-of-tick sweep.
    pub deaths: Vec<UnitId>,
    /// Units created this tick (waves and barracks).
    pub spawned: Vec<UnitId>,
    /// Walls that reached zero health this tick.
    pub breached: Vec<StructureId>,
    /// Gold credited by mines.
    pub gold_generated: u32,
    /// New phase, if it changed.
    pub phase_change: Option<MatchPhase>,
    /// Index of the wave released this tick.
    pub wave_started: Option<u32>,
}

/// A single base-defense match.
///
/// Owns the structure and unit collections, the shared gold pool and the
/// phase state machine. Entities refer to each other only by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub(crate) config: MatchConfig,
    pub(crate) difficulty: Difficulty,
    pub(crate) phase: MatchPhase,
    pub(crate) tick: u64,
    pub(crate) build_timer_ms: u32,
    /// Waves released so far.
    pub(crate) waves_launched: u32,
    /// Quiet time accumulated since the field was last cleared.
    pub(crate) wave_timer_ms: u32,
    pub(crate) treasury: Treasury,
    pub(crate) structures: StructureStorage,
    pub(crate) units: UnitStorage,
    pub(crate) selection: Option<StructureId>,
    pub(crate) rng: WaveRng,
    pub(crate) command_center: Option<StructureId>,
}

impl Match {
    /// Start a match in the build phase.
    ///
    /// Places the command center one cell up-left of the map center and,
    /// unless disabled in `config`, a ring of walls around the build area.
    /// The pool starts with the difficulty's starting gold.
    #[must_use]
    pub fn new(config: MatchConfig, difficulty: Difficulty, seed: u64) -> Self {
        let mut game = Self {
            treasury: Treasury::new(difficulty.starting_gold()),
            config,
            difficulty,
            phase: MatchPhase::Build,
            tick: 0,
            build_timer_ms: 0,
            waves_launched: 0,
            wave_timer_ms: 0,
            structures: StructureStorage::new(),
            units: UnitStorage::new(),
            selection: None,
            rng: WaveRng::new(seed),
            command_center: None,
        };

        let cell = game.config.cell_size as i32;
        let center = Vec2Fixed::from_ints(
            game.config.map_width as i32 / 2 - cell,
            game.config.map_height as i32 / 2 - cell,
        );
        let cc = game.spawn_structure(StructureKind::CommandCenter, center);
        game.command_center = Some(cc);

        if game.config.perimeter_walls {
            for origin in perimeter_wall_origins(&game.config) {
                game.spawn_structure(StructureKind::Wall, origin);
            }
        }

        info!(
            ?difficulty,
            seed,
            structures = game.structures.len(),
            "Match created"
        );
        game
    }

    /// Replace the starting gold.
    #[must_use]
    pub fn with_gold(mut self, gold: u32) -> Self {
        self.treasury = Treasury::new(gold);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Match tuning.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Gold in the shared pool.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.treasury.gold()
    }

    /// Number of waves released so far.
    #[must_use]
    pub const fn waves_launched(&self) -> u32 {
        self.waves_launched
    }

    /// Selected structure, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<StructureId> {
        self.selection
    }

    /// The command center id.
    #[must_use]
    pub const fn command_center_id(&self) -> Option<StructureId> {
        self.command_center
    }

    /// The command center, if it still exists.
    #[must_use]
    pub fn command_center(&self) -> Option<&Structure> {
        self.command_center.and_then(|id| self.structures.get(id))
    }

    /// All structures.
    #[must_use]
    pub fn structures(&self) -> &StructureStorage {
        &self.structures
    }

    /// All units.
    #[must_use]
    pub fn units(&self) -> &UnitStorage {
        &self.units
    }

    /// Look up one structure.
    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(id)
    }

    /// Look up one unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Living units of one side.
    pub fn living(&self, allegiance: Allegiance) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |u| u.allegiance == allegiance && u.is_alive())
    }

    /// Read-only view used by unit planning.
    #[must_use]
    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            units: &self.units,
            structures: &self.structures,
            config: &self.config,
            command_center: self.command_center,
        }
    }

    // ------------------------------------------------------------------
    // Validation predicates
    // ------------------------------------------------------------------

    /// Whether the pool covers `cost`.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.treasury.can_afford(cost)
    }

    /// Whether `rect` lies in the build area and overlaps no structure.
    #[must_use]
    pub fn is_valid_placement(&self, rect: &Rect) -> bool {
        check_placement(rect, &self.config, self.structures.values()).is_valid()
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Insert a structure directly, bypassing placement rules and cost.
    ///
    /// Used for match initialization and hand-built layouts.
    pub fn spawn_structure(&mut self, kind: StructureKind, origin: Vec2Fixed) -> StructureId {
        let config = &self.config;
        let id = self
            .structures
            .insert_with(|id| Structure::new(id, kind, origin, config));
        debug!(structure = %id, ?kind, "Structure spawned");
        id
    }

    /// Append a unit at `position`.
    pub fn spawn_unit(
        &mut self,
        archetype: UnitArchetype,
        allegiance: Allegiance,
        position: Vec2Fixed,
        overrides: StatOverrides,
    ) -> UnitId {
        let stats = *self.config.archetypes.get(archetype);
        let id = self.units.insert_with(|id| {
            Unit::new(id, archetype, allegiance, position, &stats, overrides)
        });
        debug!(unit = %id, ?archetype, ?allegiance, "Unit spawned");
        id
    }

    /// Append an attacker at a random border position.
    ///
    /// The unit is visible to targeting from the next unit pass.
    pub fn spawn_enemy(&mut self, archetype: UnitArchetype, overrides: StatOverrides) -> UnitId {
        let position = spawn_point(&self.config, &mut self.rng);
        self.spawn_unit(archetype, Allegiance::Attacker, position, overrides)
    }

    /// Set a structure's health, clamped to its maximum.
    ///
    /// Used by hand-built layouts such as pre-breached walls.
    pub fn set_structure_health(&mut self, id: StructureId, health: u32) -> Result<()> {
        let structure = self
            .structures
            .get_mut(id)
            .ok_or(GameError::StructureNotFound(id))?;
        structure.health.current = health.min(structure.health.max);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the match by `elapsed_ms`.
    ///
    /// A finished match ignores further ticks. A command center found at
    /// zero health at the start of a tick ends the match as lost.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickEvents {
        let mut events = TickEvents::default();
        if self.phase.is_over() {
            return events;
        }

        if self.command_center().is_some_and(|cc| !cc.is_standing()) {
            info!(tick = self.tick, "Command center already destroyed");
            self.set_phase(MatchPhase::Lost, &mut events);
        } else {
            self.update_phase(elapsed_ms, &mut events);
        }
        if !self.phase.is_over() {
            self.run_structures(elapsed_ms, &mut events);
            self.run_units(elapsed_ms, &mut events);
        }
        events.deaths = self.units.remove_where(|unit| !unit.is_alive());

        self.tick += 1;
        trace!(tick = self.tick, state_hash = self.state_hash(), "Match state hash");
        events
    }

    /// Leave the build phase and release the first wave.
    pub(crate) fn start_battle(&mut self, events: &mut TickEvents) {
        self.set_phase(MatchPhase::Battle, events);
        self.wave_timer_ms = 0;
        if self.waves_launched < self.config.wave_count() {
            self.launch_wave(events);
        }
    }

    fn update_phase(&mut self, elapsed_ms: u32, events: &mut TickEvents) {
        match self.phase {
            MatchPhase::Build => {
                self.build_timer_ms = self.build_timer_ms.saturating_add(elapsed_ms);
                if self.build_timer_ms >= self.config.build_time_ms {
                    self.start_battle(events);
                }
            }
            MatchPhase::Battle => {
                if self.living(Allegiance::Attacker).next().is_some() {
                    self.wave_timer_ms = 0;
                    return;
                }
                self.wave_timer_ms = self.wave_timer_ms.saturating_add(elapsed_ms);
                if self.wave_timer_ms < self.config.wave_interval_ms {
                    return;
                }
                self.wave_timer_ms = 0;
                if self.waves_launched < self.config.wave_count() {
                    self.launch_wave(events);
                } else {
                    self.set_phase(MatchPhase::Won, events);
                }
            }
            MatchPhase::Won | MatchPhase::Lost => {}
        }
    }

    fn launch_wave(&mut self, events: &mut TickEvents) {
        let wave = self.waves_launched;
        let orders = plan_wave(&self.config, wave, self.difficulty, &mut self.rng);

        // Leftover attackers from the previous wave do not carry over.
        let cleared = self
            .units
            .remove_where(|unit| unit.allegiance == Allegiance::Attacker);
        events.deaths.extend(cleared);

        for order in &orders {
            let id = self.spawn_enemy(order.archetype, order.overrides);
            events.spawned.push(id);
        }

        self.waves_launched += 1;
        events.wave_started = Some(wave);
        info!(wave, units = orders.len(), "Wave released");
    }

    fn set_phase(&mut self, phase: MatchPhase, events: &mut TickEvents) {
        info!(from = ?self.phase, to = ?phase, tick = self.tick, "Phase change");
        self.phase = phase;
        events.phase_change = Some(phase);
    }

    fn run_structures(&mut self, elapsed_ms: u32, events: &mut TickEvents) {
        let ctx = PassiveContext {
            battle_active: self.phase == MatchPhase::Battle,
            attackers_present: self.living(Allegiance::Attacker).next().is_some(),
        };

        for id in self.structures.ids() {
            let Some(structure) = self.structures.get_mut(id) else {
                continue;
            };
            let outcome = structure.tick_passive(elapsed_ms, ctx);
            let exhausted = !structure.is_standing();

            match outcome {
                Some(PassiveOutcome::SpawnDefender { at }) => {
                    let unit = self.spawn_unit(
                        UnitArchetype::Warrior,
                        Allegiance::Defender,
                        at,
                        StatOverrides::default(),
                    );
                    events.spawned.push(unit);
                }
                Some(PassiveOutcome::Yield { amount }) => {
                    self.treasury.deposit(amount);
                    events.gold_generated += amount;
                    if exhausted {
                        info!(structure = %id, "Gold mine exhausted");
                    }
                }
                None => {}
            }
        }
    }

    fn run_units(&mut self, elapsed_ms: u32, events: &mut TickEvents) {
        for id in self.units.ids() {
            let Some(mut unit) = self.units.get(id).filter(|u| u.is_alive()).cloned() else {
                continue;
            };

            let action = plan(&mut unit, &self.view());
            let mut lost = false;
            match action {
                UnitAction::Idle => {}
                UnitAction::MoveTo(destination) => {
                    unit.position = next_position(&unit, destination, &self.view());
                }
                UnitAction::Attack(target) => {
                    if let Some(event) = self.resolve_attack(&mut unit, target, elapsed_ms) {
                        lost = self.apply_hit(&mut unit, event, events);
                    }
                }
            }

            if let Some(slot) = self.units.get_mut(id) {
                *slot = unit;
            }
            if lost {
                break;
            }
        }
    }

    fn resolve_attack(
        &mut self,
        unit: &mut Unit,
        target: TargetRef,
        elapsed_ms: u32,
    ) -> Option<DamageEvent> {
        match target {
            TargetRef::Unit(target_id) => {
                let victim = self.units.get_mut(target_id)?;
                try_attack(unit, victim, elapsed_ms)
            }
            TargetRef::Structure(target_id) => {
                let victim = self.structures.get_mut(target_id)?;
                try_attack(unit, victim, elapsed_ms)
            }
        }
    }

    /// Apply the consequences of a landed hit. Returns true if the match
    /// was lost.
    fn apply_hit(&mut self, unit: &mut Unit, event: DamageEvent, events: &mut TickEvents) -> bool {
        events.damage.push(event);
        if !event.lethal {
            return false;
        }

        match event.target {
            TargetRef::Unit(victim) => {
                debug!(unit = %unit.id, victim = %victim, "Unit killed");
                false
            }
            TargetRef::Structure(victim) if Some(victim) == self.command_center => {
                info!(unit = %unit.id, tick = self.tick, "Command center destroyed");
                self.set_phase(MatchPhase::Lost, events);
                true
            }
            TargetRef::Structure(victim) => {
                let is_wall = self
                    .structures
                    .get(victim)
                    .is_some_and(Structure::is_breached_wall);
                if is_wall {
                    events.breached.push(victim);
                    info!(unit = %unit.id, wall = %victim, "Wall breached");
                    if unit.wall_attack_target() == Some(victim) {
                        unit.commitment = Some(Commitment::ApproachBreach(victim));
                    }
                }
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Determinism helpers
    // ------------------------------------------------------------------

    /// Hash of the complete mutable state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.build_timer_ms.hash(&mut hasher);
        self.waves_launched.hash(&mut hasher);
        self.wave_timer_ms.hash(&mut hasher);
        self.treasury.hash(&mut hasher);
        self.selection.hash(&mut hasher);
        self.rng.hash(&mut hasher);
        self.structures.hash(&mut hasher);
        self.units.hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the full match as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Snapshot`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(format!("encode: {e}")))
    }

    /// Decode a match produced by [`Match::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Snapshot`] if the bytes are not a valid match.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| GameError::Snapshot(format!("decode: {e}")))
    }
}

/// Top-left corners of the perimeter walls, in placement order.
fn perimeter_wall_origins(config: &MatchConfig) -> Vec<Vec2Fixed> {
    let width = config.map_width as i32;
    let height = config.map_height as i32;
    let border = config.border as i32;
    let cell = config.cell_size as i32;
    if cell <= 0 {
        return Vec::new();
    }

    let mut origins = Vec::new();
    for y in [border, height - border - cell] {
        let mut x = border;
        while x < width - border {
            origins.push(Vec2Fixed::from_ints(x, y));
            x += cell;
        }
    }
    for x in [border, width - border - cell] {
        let mut y = border + cell;
        while y < height - border - cell {
            origins.push(Vec2Fixed::from_ints(x, y));
            y += cell;
        }
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> MatchConfig {
        MatchConfig {
            perimeter_walls: false,
            build_time_ms: u32::MAX,
            ..MatchConfig::default()
        }
    }

    fn kinds(game: &Match, kind: StructureKind) -> usize {
        game.structures().values().filter(|s| s.kind() == kind).count()
    }

    #[test]
    fn test_new_match_layout() {
        let game = Match::new(MatchConfig::default(), Difficulty::Medium, 1);
        assert_eq!(game.phase(), MatchPhase::Build);
        assert_eq!(game.gold(), 400);

        let cc = game.command_center().unwrap();
        assert_eq!(cc.bounds.origin, Vec2Fixed::from_ints(448, 320));
        assert_eq!(kinds(&game, StructureKind::CommandCenter), 1);
        // 12 per row, 6 per column
        assert_eq!(kinds(&game, StructureKind::Wall), 36);
    }

    #[test]
    fn test_perimeter_walls_stay_in_build_area() {
        let game = Match::new(MatchConfig::default(), Difficulty::Easy, 1);
        let area = crate::placement::build_area(game.config());
        for wall in game
            .structures()
            .values()
            .filter(|s| s.kind() == StructureKind::Wall)
        {
            assert!(area.contains_rect(&wall.bounds));
            assert!(!wall.bounds.overlaps(&game.command_center().unwrap().bounds));
        }
    }

    #[test]
    fn test_build_timer_starts_battle() {
        let mut game = Match::new(MatchConfig::default(), Difficulty::Easy, 3);
        let mut started = None;
        for _ in 0..200 {
            let events = game.tick(DEFAULT_TICK_MS);
            if events.phase_change == Some(MatchPhase::Battle) {
                started = Some(events);
                break;
            }
        }
        let events = started.expect("battle starts within 200 ticks");
        assert_eq!(events.wave_started, Some(0));
        assert_eq!(events.spawned.len(), 6);
        assert_eq!(game.living(Allegiance::Attacker).count(), 6);
    }

    #[test]
    fn test_wave_schedule_and_win() {
        let mut config = quiet_config();
        config.build_time_ms = 0;
        config.wave_interval_ms = 100;
        config.waves.truncate(1);
        let mut game = Match::new(config, Difficulty::Easy, 5);

        let events = game.tick(10);
        assert_eq!(events.wave_started, Some(0));

        // Kill the wave by hand.
        for id in game.units.ids() {
            game.units.get_mut(id).unwrap().health.current = 0;
        }
        game.tick(10);
        assert_eq!(game.living(Allegiance::Attacker).count(), 0);

        // Interval not yet elapsed.
        for _ in 0..8 {
            game.tick(10);
        }
        assert_eq!(game.phase(), MatchPhase::Battle);
        let events = game.tick(20);
        assert_eq!(events.phase_change, Some(MatchPhase::Won));

        let hash = game.state_hash();
        assert_eq!(game.tick(10), TickEvents::default());
        assert_eq!(game.state_hash(), hash);
    }

    #[test]
    fn test_command_center_loss_stops_unit_pass() {
        let mut game = Match::new(quiet_config(), Difficulty::Easy, 1);
        game.command_center_mut_for_test().health.current = 5;
        let center = game.command_center().unwrap().center();
        let a = game.spawn_unit(
            UnitArchetype::Warrior,
            Allegiance::Attacker,
            center + Vec2Fixed::from_ints(-40, 0),
            StatOverrides::default(),
        );
        let b = game.spawn_unit(
            UnitArchetype::Warrior,
            Allegiance::Attacker,
            center + Vec2Fixed::from_ints(40, 0),
            StatOverrides::default(),
        );
        game.units.get_mut(a).unwrap().cooldown_ms = 1500;
        game.units.get_mut(b).unwrap().cooldown_ms = 1500;

        let events = game.tick(DEFAULT_TICK_MS);
        assert_eq!(game.phase(), MatchPhase::Lost);
        assert_eq!(events.damage.len(), 1);
        assert_eq!(events.damage[0].attacker, a);
        // The second attacker never acted.
        assert_eq!(game.unit(b).unwrap().cooldown_ms, 1500);
    }

    #[test]
    fn test_zeroed_command_center_ends_match() {
        let mut game = Match::new(quiet_config(), Difficulty::Easy, 1);
        let cc = game.command_center().unwrap().id;
        game.set_structure_health(cc, 0).unwrap();

        let events = game.tick(DEFAULT_TICK_MS);
        assert_eq!(events.phase_change, Some(MatchPhase::Lost));
        assert_eq!(game.phase(), MatchPhase::Lost);
    }

    #[test]
    fn test_dead_units_swept_same_tick() {
        let mut game = Match::new(quiet_config(), Difficulty::Easy, 1);
        let attacker = game.spawn_unit(
            UnitArchetype::Warrior,
            Allegiance::Attacker,
            Vec2Fixed::from_ints(200, 200),
            StatOverrides::default(),
        );
        let defender = game.spawn_unit(
            UnitArchetype::Warrior,
            Allegiance::Defender,
            Vec2Fixed::from_ints(230, 200),
            StatOverrides { health: Some(10), damage: None },
        );
        game.units.get_mut(attacker).unwrap().cooldown_ms = 1499;

        let events = game.tick(DEFAULT_TICK_MS);
        assert_eq!(events.deaths, vec![defender]);
        assert!(game.unit(defender).is_none());
        assert!(game.unit(attacker).is_some());
    }

    #[test]
    fn test_wall_kill_converts_commitment() {
        let mut game = Match::new(quiet_config(), Difficulty::Easy, 1);
        // Wall directly left of the command center, attacker further left.
        let wall = game.spawn_structure(StructureKind::Wall, Vec2Fixed::from_ints(320, 352));
        game.structures.get_mut(wall).unwrap().health.current = 10;
        let attacker = game.spawn_unit(
            UnitArchetype::Warrior,
            Allegiance::Attacker,
            Vec2Fixed::from_ints(300, 384),
            StatOverrides::default(),
        );

        let mut breached = false;
        for _ in 0..200 {
            let events = game.tick(DEFAULT_TICK_MS);
            if events.breached.contains(&wall) {
                breached = true;
                break;
            }
        }
        assert!(breached);
        assert_eq!(
            game.unit(attacker).unwrap().commitment,
            Some(Commitment::ApproachBreach(wall))
        );
    }

    #[test]
    fn test_mine_pays_in_build_phase() {
        let mut game = Match::new(quiet_config(), Difficulty::Easy, 1);
        let mine = game.spawn_structure(StructureKind::GoldMine, Vec2Fixed::from_ints(192, 192));
        let mut generated = 0;
        for _ in 0..10 {
            generated += game.tick(500).gold_generated;
        }
        assert_eq!(generated, 25);
        assert_eq!(game.gold(), 525);
        assert_eq!(game.structure(mine).unwrap().health.current, 145);
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_hash() {
        let mut game = Match::new(MatchConfig::default(), Difficulty::Hard, 9);
        for _ in 0..300 {
            game.tick(DEFAULT_TICK_MS);
        }
        let bytes = game.serialize().unwrap();
        let mut restored = Match::deserialize(&bytes).unwrap();
        assert_eq!(restored.state_hash(), game.state_hash());

        for _ in 0..50 {
            game.tick(DEFAULT_TICK_MS);
            restored.tick(DEFAULT_TICK_MS);
        }
        assert_eq!(restored.state_hash(), game.state_hash());
    }

    #[test]
    fn test_garbage_snapshot_is_error() {
        let err = Match::deserialize(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, GameError::Snapshot(_)));
    }

    impl Match {
        fn command_center_mut_for_test(&mut self) -> &mut Structure {
            let id = self.command_center.unwrap();
            self.structures.get_mut(id).unwrap()
        }
    }
}

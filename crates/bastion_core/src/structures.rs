//! Grid-aligned structures and their passive behavior.
//!
//! Structures are never removed at zero health. A wall at zero is a breach:
//! it stays in the collection, no longer blocks line of sight, and waits for
//! a repair that replaces it with a fresh wall under a new id.

use serde::{Deserialize, Serialize};

use crate::components::{Footprint, Health, StructureId};
use crate::config::MatchConfig;
use crate::geometry::Rect;
use crate::math::{Fixed, Vec2Fixed};

/// Structure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// The structure the player must protect.
    CommandCenter,
    /// Spawns defenders from a funded reserve.
    Barracks,
    /// Generates gold, wearing down as it does.
    GoldMine,
    /// Perimeter obstacle.
    Wall,
}

impl StructureKind {
    /// Whether the player may place this kind.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        !matches!(self, Self::CommandCenter)
    }
}

/// Category-specific mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureRole {
    /// No passive behavior.
    CommandCenter,
    /// Defender production.
    Barracks {
        /// Time accumulated towards the next spawn.
        spawn_timer_ms: u32,
        /// Time between spawns.
        spawn_interval_ms: u32,
        /// Gold set aside for hiring.
        reserve: u32,
        /// Reserve debited per spawn.
        hire_cost: u32,
    },
    /// Gold production.
    GoldMine {
        /// Time accumulated towards the next payout.
        timer_ms: u32,
        /// Time between payouts.
        interval_ms: u32,
        /// Gold per payout.
        yield_amount: u32,
        /// Health lost per payout.
        depletion: u32,
    },
    /// Obstacle.
    Wall {
        /// Gold needed to rebuild once breached.
        repair_cost: u32,
    },
}

/// Facts about the match a structure's passive update depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveContext {
    /// The match is in its battle phase.
    pub battle_active: bool,
    /// At least one living attacker exists.
    pub attackers_present: bool,
}

/// Result of a structure's passive update that the match must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveOutcome {
    /// Spawn one defender here.
    SpawnDefender {
        /// Spawn point.
        at: Vec2Fixed,
    },
    /// Credit the shared pool.
    Yield {
        /// Gold produced.
        amount: u32,
    },
}

/// A placed structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    /// Identity.
    pub id: StructureId,
    /// World-space footprint.
    pub bounds: Rect,
    /// Size in cells.
    pub footprint: Footprint,
    /// Health, clamped to `[0, max]`.
    pub health: Health,
    /// Category state.
    pub role: StructureRole,
}

impl Structure {
    /// Build a fresh structure of `kind` with its top-left corner at `origin`.
    #[must_use]
    pub fn new(id: StructureId, kind: StructureKind, origin: Vec2Fixed, config: &MatchConfig) -> Self {
        let spec = config.spec(kind);
        let cell = Fixed::from_num(config.cell_size);
        let bounds = Rect::new(
            origin,
            cell * Fixed::from_num(spec.footprint.width),
            cell * Fixed::from_num(spec.footprint.height),
        );

        let role = match kind {
            StructureKind::CommandCenter => StructureRole::CommandCenter,
            StructureKind::Barracks => StructureRole::Barracks {
                spawn_timer_ms: 0,
                spawn_interval_ms: config.barracks.spawn_interval_ms,
                reserve: 0,
                hire_cost: config.barracks.hire_cost,
            },
            StructureKind::GoldMine => StructureRole::GoldMine {
                timer_ms: 0,
                interval_ms: config.gold_mine.interval_ms,
                yield_amount: config.gold_mine.yield_amount,
                depletion: config.gold_mine.depletion,
            },
            StructureKind::Wall => StructureRole::Wall {
                repair_cost: config.wall.repair_cost,
            },
        };

        Self {
            id,
            bounds,
            footprint: spec.footprint,
            health: Health::new(spec.max_health),
            role,
        }
    }

    /// Category.
    #[must_use]
    pub const fn kind(&self) -> StructureKind {
        match self.role {
            StructureRole::CommandCenter => StructureKind::CommandCenter,
            StructureRole::Barracks { .. } => StructureKind::Barracks,
            StructureRole::GoldMine { .. } => StructureKind::GoldMine,
            StructureRole::Wall { .. } => StructureKind::Wall,
        }
    }

    /// Logical center, used for ranges and distances.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        self.bounds.center()
    }

    /// Health above zero.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        !self.health.is_dead()
    }

    /// A wall with health left. Only these block line of sight.
    #[must_use]
    pub const fn is_intact_wall(&self) -> bool {
        matches!(self.role, StructureRole::Wall { .. }) && self.is_standing()
    }

    /// A wall at zero health.
    #[must_use]
    pub const fn is_breached_wall(&self) -> bool {
        matches!(self.role, StructureRole::Wall { .. }) && self.health.is_dead()
    }

    /// Production or resource structure still standing.
    #[must_use]
    pub const fn is_raid_target(&self) -> bool {
        matches!(
            self.role,
            StructureRole::Barracks { .. } | StructureRole::GoldMine { .. }
        ) && self.is_standing()
    }

    /// Gold needed to rebuild this structure, if it is at zero health and
    /// of a rebuildable kind.
    #[must_use]
    pub fn repair_cost(&self, config: &MatchConfig) -> Option<u32> {
        if self.is_standing() {
            return None;
        }
        match self.role {
            StructureRole::Wall { repair_cost } => Some(repair_cost),
            StructureRole::GoldMine { .. } => Some(config.gold_mine.restore_cost),
            StructureRole::CommandCenter | StructureRole::Barracks { .. } => None,
        }
    }

    /// Barracks reserve, if this is a barracks.
    #[must_use]
    pub const fn reserve(&self) -> Option<u32> {
        match self.role {
            StructureRole::Barracks { reserve, .. } => Some(reserve),
            _ => None,
        }
    }

    /// Add to the barracks reserve. Returns false for other kinds.
    pub fn add_reserve(&mut self, amount: u32) -> bool {
        match &mut self.role {
            StructureRole::Barracks { reserve, .. } => {
                *reserve = reserve.saturating_add(amount);
                true
            }
            _ => false,
        }
    }

    /// Advance passive production by `elapsed_ms`.
    pub fn tick_passive(&mut self, elapsed_ms: u32, ctx: PassiveContext) -> Option<PassiveOutcome> {
        if !self.is_standing() {
            return None;
        }

        let center = self.center();
        match &mut self.role {
            StructureRole::Barracks {
                spawn_timer_ms,
                spawn_interval_ms,
                reserve,
                hire_cost,
            } => {
                if !ctx.battle_active || !ctx.attackers_present {
                    return None;
                }
                *spawn_timer_ms = spawn_timer_ms.saturating_add(elapsed_ms);
                if *spawn_timer_ms >= *spawn_interval_ms && *reserve >= *hire_cost {
                    *spawn_timer_ms = 0;
                    *reserve -= *hire_cost;
                    return Some(PassiveOutcome::SpawnDefender { at: center });
                }
                None
            }
            StructureRole::GoldMine {
                timer_ms,
                interval_ms,
                yield_amount,
                depletion,
            } => {
                *timer_ms = timer_ms.saturating_add(elapsed_ms);
                if *timer_ms < *interval_ms {
                    return None;
                }
                *timer_ms = 0;
                let amount = *yield_amount;
                let depletion = *depletion;
                self.health.apply_damage(depletion);
                Some(PassiveOutcome::Yield { amount })
            }
            StructureRole::CommandCenter | StructureRole::Wall { .. } => None,
        }
    }
}

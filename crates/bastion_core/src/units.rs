//! Mobile combatants.
//!
//! A unit carries its own combat stats (copied from the archetype table at
//! spawn, optionally overridden for bosses) plus the small amount of state the
//! navigation planner persists between ticks.

use serde::{Deserialize, Serialize};

use crate::components::{Allegiance, Health, StructureId, TargetRef, UnitId};
use crate::config::ArchetypeStats;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Combat class of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitArchetype {
    /// Fast melee infantry.
    Warrior,
    /// Ranged infantry.
    Archer,
    /// Slow, heavy siege unit.
    Giant,
}

impl UnitArchetype {
    /// All archetypes in declaration order.
    pub const ALL: [Self; 3] = [Self::Warrior, Self::Archer, Self::Giant];

    /// Raiders divert to production and resource structures near their path.
    #[must_use]
    pub const fn is_raider(self) -> bool {
        matches!(self, Self::Giant)
    }
}

/// Resolved combat and movement stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Movement per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Damage per hit.
    pub damage: u32,
    /// Attack range, measured to the target's center.
    #[serde(with = "fixed_serde")]
    pub attack_range: Fixed,
    /// Time between hits.
    pub cooldown_ms: u32,
    /// Body radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

impl From<&ArchetypeStats> for UnitStats {
    fn from(stats: &ArchetypeStats) -> Self {
        Self {
            speed: stats.speed(),
            damage: stats.damage,
            attack_range: Fixed::from_num(stats.range),
            cooldown_ms: stats.cooldown_ms,
            radius: Fixed::from_num(stats.radius),
        }
    }
}

/// Per-spawn replacements for archetype stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverrides {
    /// Replacement maximum health.
    pub health: Option<u32>,
    /// Replacement damage per hit.
    pub damage: Option<u32>,
}

/// A multi-tick navigation decision.
///
/// Holding at most one of these is what keeps an attacker from flip-flopping
/// between two walls of similar distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commitment {
    /// Walk to the center of this breached wall.
    ApproachBreach(StructureId),
    /// Break this intact wall.
    AttackWall(StructureId),
}

/// A unit in the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Identity.
    pub id: UnitId,
    /// Combat class.
    pub archetype: UnitArchetype,
    /// Side.
    pub allegiance: Allegiance,
    /// World position (continuous).
    pub position: Vec2Fixed,
    /// Health.
    pub health: Health,
    /// Resolved stats.
    pub stats: UnitStats,
    /// Time accumulated towards the next hit while in range.
    pub cooldown_ms: u32,
    /// What the unit decided on this tick (for render attack lines).
    pub target: Option<TargetRef>,
    /// Persisted navigation decision.
    pub commitment: Option<Commitment>,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(
        id: UnitId,
        archetype: UnitArchetype,
        allegiance: Allegiance,
        position: Vec2Fixed,
        base: &ArchetypeStats,
        overrides: StatOverrides,
    ) -> Self {
        let mut stats = UnitStats::from(base);
        if let Some(damage) = overrides.damage {
            stats.damage = damage;
        }

        Self {
            id,
            archetype,
            allegiance,
            position,
            health: Health::new(overrides.health.unwrap_or(base.health)),
            stats,
            cooldown_ms: 0,
            target: None,
            commitment: None,
        }
    }

    /// Alive means health above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Whether `point` is within attack range.
    #[must_use]
    pub fn in_range_of(&self, point: Vec2Fixed) -> bool {
        let range = self.stats.attack_range;
        self.position.distance_squared(point) <= range * range
    }

    /// Intact wall this unit is breaking, if any.
    #[must_use]
    pub fn wall_attack_target(&self) -> Option<StructureId> {
        match self.commitment {
            Some(Commitment::AttackWall(id)) => Some(id),
            _ => None,
        }
    }

    /// Position after one step towards `destination`.
    ///
    /// Full-speed step along the unit direction; no easing near the target.
    #[must_use]
    pub fn step_towards(&self, destination: Vec2Fixed) -> Vec2Fixed {
        let direction = (destination - self.position).normalize();
        self.position + direction.scale(self.stats.speed)
    }
}

//! Cooldown-gated damage resolution.
//!
//! The resolver only moves health and the attacker's cooldown. Consequences
//! (removing dead units, turning a wall into a breach, losing the match) are
//! applied by the match loop from the returned [`DamageEvent`].

use serde::{Deserialize, Serialize};

use crate::components::{Health, TargetRef, UnitId};
use crate::math::Vec2Fixed;
use crate::structures::Structure;
use crate::units::Unit;

/// A hit that landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Unit that dealt the damage.
    pub attacker: UnitId,
    /// What was hit.
    pub target: TargetRef,
    /// Health actually removed.
    pub damage: u32,
    /// The hit took the target to zero.
    pub lethal: bool,
}

/// Anything with health and a logical center.
pub trait Damageable {
    /// Reference other entities use to name this one.
    fn target_ref(&self) -> TargetRef;
    /// Point ranges are measured to.
    fn aim_point(&self) -> Vec2Fixed;
    /// Health.
    fn health(&self) -> &Health;
    /// Mutable health.
    fn health_mut(&mut self) -> &mut Health;
}

impl Damageable for Unit {
    fn target_ref(&self) -> TargetRef {
        TargetRef::Unit(self.id)
    }

    fn aim_point(&self) -> Vec2Fixed {
        self.position
    }

    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

impl Damageable for Structure {
    fn target_ref(&self) -> TargetRef {
        TargetRef::Structure(self.id)
    }

    fn aim_point(&self) -> Vec2Fixed {
        self.center()
    }

    fn health(&self) -> &Health {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }
}

/// Attempt one attack.
///
/// Out of range (or already dead) targets do not advance the cooldown. In
/// range, `elapsed_ms` accumulates; once it reaches the attacker's cooldown
/// the counter resets and damage lands. No friendly-fire filtering happens
/// here.
pub fn try_attack<T: Damageable>(
    attacker: &mut Unit,
    target: &mut T,
    elapsed_ms: u32,
) -> Option<DamageEvent> {
    if target.health().is_dead() || !attacker.in_range_of(target.aim_point()) {
        return None;
    }

    attacker.cooldown_ms = attacker.cooldown_ms.saturating_add(elapsed_ms);
    if attacker.cooldown_ms < attacker.stats.cooldown_ms {
        return None;
    }
    attacker.cooldown_ms = 0;

    let damage = target.health_mut().apply_damage(attacker.stats.damage);
    Some(DamageEvent {
        attacker: attacker.id,
        target: target.target_ref(),
        damage,
        lethal: target.health().is_dead(),
    })
}

//! Target selection.
//!
//! Every function here is a pure query over a [`WorldView`]: calling it twice
//! with no state change in between gives the same answer. Persisted
//! navigation commitments live on the unit and are handled by
//! [`crate::navigation`].
//!
//! "Nearest" always means the strict minimum of squared distance to the
//! candidate's logical center; on an exact tie the candidate earliest in
//! insertion order wins.

use crate::components::{Allegiance, StructureId, UnitId};
use crate::geometry::{distance_to_line, line_intersects_rect};
use crate::math::{Fixed, Vec2Fixed};
use crate::structures::Structure;
use crate::units::Unit;
use crate::world::WorldView;

/// What an attacker should go after this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackerGoal {
    /// A defender close enough to fight.
    EngageDefender(UnitId),
    /// A production or resource structure near the path (raiders only).
    Raid(StructureId),
    /// Straight, unobstructed line to the command center.
    AssaultCommandCenter(StructureId),
    /// Nearest intact wall on the line to the command center.
    BreakWall(StructureId),
    /// A breach that leads to the command center.
    ThreadBreach(StructureId),
    /// Nothing to do (no command center).
    Idle,
}

/// Keep the first strictly-smaller candidate.
fn nearest_by<'a, T: 'a>(
    from: Vec2Fixed,
    candidates: impl Iterator<Item = &'a T>,
    point_of: impl Fn(&T) -> Vec2Fixed,
) -> Option<(&'a T, Fixed)> {
    let mut best: Option<(&'a T, Fixed)> = None;
    for candidate in candidates {
        let dist_sq = from.distance_squared(point_of(candidate));
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((candidate, dist_sq)),
        }
    }
    best
}

/// Nearest living unit of `allegiance`, with its squared distance.
#[must_use]
pub fn nearest_living_unit<'a>(
    from: Vec2Fixed,
    allegiance: Allegiance,
    view: &WorldView<'a>,
) -> Option<(&'a Unit, Fixed)> {
    nearest_by(
        from,
        view.living_units().filter(|u| u.allegiance == allegiance),
        |u| u.position,
    )
}

/// Target for a defender: the nearest living attacker, at any distance.
#[must_use]
pub fn select_defender_target(unit: &Unit, view: &WorldView<'_>) -> Option<UnitId> {
    nearest_living_unit(unit.position, Allegiance::Attacker, view).map(|(target, _)| target.id)
}

/// Nearest living defender within 1.5x the attacker's range.
#[must_use]
pub fn engageable_defender<'a>(unit: &Unit, view: &WorldView<'a>) -> Option<&'a Unit> {
    let (defender, dist_sq) = nearest_living_unit(unit.position, Allegiance::Defender, view)?;
    let range = unit.stats.attack_range;
    // dist <= 1.5 * range, squared and scaled by 4
    (dist_sq * 4 <= range * range * 9).then_some(defender)
}

/// Does any intact wall touch the segment `from -> to`?
#[must_use]
pub fn path_blocked(from: Vec2Fixed, to: Vec2Fixed, view: &WorldView<'_>) -> bool {
    view.intact_walls()
        .any(|wall| line_intersects_rect(from, to, &wall.bounds))
}

/// Nearest intact wall whose footprint touches the segment `from -> to`.
#[must_use]
pub fn blocking_wall<'a>(
    from: Vec2Fixed,
    to: Vec2Fixed,
    view: &WorldView<'a>,
) -> Option<(&'a Structure, Fixed)> {
    nearest_by(
        from,
        view.intact_walls()
            .filter(|wall| line_intersects_rect(from, to, &wall.bounds)),
        Structure::center,
    )
}

/// Nearest breached wall that is reachable from `from` and from which the
/// command center at `goal` is reachable, both without crossing an intact wall.
#[must_use]
pub fn passable_breach<'a>(
    from: Vec2Fixed,
    goal: Vec2Fixed,
    view: &WorldView<'a>,
) -> Option<(&'a Structure, Fixed)> {
    nearest_by(
        from,
        view.structures.values().filter(|s| {
            s.is_breached_wall()
                && !path_blocked(from, s.center(), view)
                && !path_blocked(s.center(), goal, view)
        }),
        Structure::center,
    )
}

/// Nearest standing production or resource structure within the raid
/// corridor around `from -> goal`, reachable in a straight line.
#[must_use]
pub fn raid_target<'a>(
    from: Vec2Fixed,
    goal: Vec2Fixed,
    view: &WorldView<'a>,
) -> Option<&'a Structure> {
    let corridor = Fixed::from_num(view.config.raid_corridor_cells * view.config.cell_size);
    nearest_by(
        from,
        view.structures.values().filter(|s| {
            s.is_raid_target()
                && distance_to_line(from, goal, s.center()) <= corridor
                && !path_blocked(from, s.center(), view)
        }),
        Structure::center,
    )
    .map(|(structure, _)| structure)
}

/// Decide what an attacker goes after, in strict priority order.
///
/// 1. A defender within 1.5x attack range.
/// 2. For raiders, a production or resource structure near the path.
/// 3. The command center when no intact wall is in the way.
/// 4. The nearest blocking wall, or the nearest passable breach when it is
///    at most 1.5x farther than that wall.
///
/// Walking at the command center with no obstruction reasoning is the same
/// move as 3: without a blocking wall there is nothing left to reason about.
#[must_use]
pub fn select_attacker_goal(unit: &Unit, view: &WorldView<'_>) -> AttackerGoal {
    if let Some(defender) = engageable_defender(unit, view) {
        return AttackerGoal::EngageDefender(defender.id);
    }

    let Some(command_center) = view.command_center() else {
        return AttackerGoal::Idle;
    };
    let goal = command_center.center();

    if unit.archetype.is_raider() {
        if let Some(structure) = raid_target(unit.position, goal, view) {
            return AttackerGoal::Raid(structure.id);
        }
    }

    let Some((wall, wall_sq)) = blocking_wall(unit.position, goal, view) else {
        return AttackerGoal::AssaultCommandCenter(command_center.id);
    };

    match passable_breach(unit.position, goal, view) {
        // breach <= 1.5 * wall, squared and scaled by 4
        Some((breach, breach_sq)) if breach_sq * 4 <= wall_sq * 9 => {
            AttackerGoal::ThreadBreach(breach.id)
        }
        _ => AttackerGoal::BreakWall(wall.id),
    }
}

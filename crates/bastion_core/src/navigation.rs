//! Per-unit decision making.
//!
//! [`plan`] turns a unit and a read-only [`WorldView`] into one
//! [`UnitAction`] for this tick. Attackers persist a [`Commitment`] across
//! ticks:
//!
//! ```text
//!   (select) --BreakWall--> AttackWall(w) --w reaches 0 by our hit--> ApproachBreach(w)
//!   (select) --ThreadBreach--> ApproachBreach(b) --within arrival radius--> (select next tick)
//! ```
//!
//! A commitment whose structure vanished or changed state is dropped and the
//! unit re-selects in the same tick.
//!
//! Unit targets and raid targets are sticky: the target chosen on an earlier
//! tick is kept while it is still alive (or standing) and selection only
//! runs once it is gone.

use tracing::debug;

use crate::components::{Allegiance, TargetRef};
use crate::math::{Fixed, Vec2Fixed};
use crate::structures::Structure;
use crate::targeting::{select_attacker_goal, select_defender_target, AttackerGoal};
use crate::units::{Commitment, Unit};
use crate::world::WorldView;

/// What a unit does this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitAction {
    /// Stand still.
    Idle,
    /// Take one step towards a point.
    MoveTo(Vec2Fixed),
    /// Run the combat resolver against a target in range.
    Attack(TargetRef),
}

/// Decide this tick's action, updating the unit's target and commitment.
pub fn plan(unit: &mut Unit, view: &WorldView<'_>) -> UnitAction {
    match unit.allegiance {
        Allegiance::Defender => plan_defender(unit, view),
        Allegiance::Attacker => plan_attacker(unit, view),
    }
}

/// The enemy unit targeted on an earlier tick, if it is still alive.
fn current_enemy<'a>(unit: &Unit, view: &WorldView<'a>) -> Option<&'a Unit> {
    let Some(TargetRef::Unit(id)) = unit.target else {
        return None;
    };
    view.units
        .get(id)
        .filter(|enemy| enemy.is_alive() && enemy.allegiance == unit.allegiance.opponent())
}

/// The structure being raided, if it is still standing.
fn current_raid<'a>(unit: &Unit, view: &WorldView<'a>) -> Option<&'a Structure> {
    let Some(TargetRef::Structure(id)) = unit.target else {
        return None;
    };
    view.structures
        .get(id)
        .filter(|structure| structure.is_raid_target())
}

fn plan_defender(unit: &mut Unit, view: &WorldView<'_>) -> UnitAction {
    if let Some(enemy) = current_enemy(unit, view) {
        return engage(unit, TargetRef::Unit(enemy.id), enemy.position);
    }

    unit.target = None;
    let Some(target_id) = select_defender_target(unit, view) else {
        return UnitAction::Idle;
    };
    match view.units.get(target_id) {
        Some(target) => engage(unit, TargetRef::Unit(target_id), target.position),
        None => UnitAction::Idle,
    }
}

fn plan_attacker(unit: &mut Unit, view: &WorldView<'_>) -> UnitAction {
    if let Some(defender) = current_enemy(unit, view) {
        return engage(unit, TargetRef::Unit(defender.id), defender.position);
    }
    if let Some(structure) = current_raid(unit, view) {
        return engage(unit, TargetRef::Structure(structure.id), structure.center());
    }

    unit.target = None;
    let goal = select_attacker_goal(unit, view);

    match goal {
        AttackerGoal::Idle => return UnitAction::Idle,
        AttackerGoal::EngageDefender(id) => {
            return match view.units.get(id) {
                Some(defender) => engage(unit, TargetRef::Unit(id), defender.position),
                None => UnitAction::Idle,
            };
        }
        _ => {}
    }

    if let Some(action) = follow_commitment(unit, view) {
        return action;
    }

    match goal {
        AttackerGoal::Raid(id) | AttackerGoal::AssaultCommandCenter(id) => {
            match view.structures.get(id) {
                Some(structure) => engage(unit, TargetRef::Structure(id), structure.center()),
                None => UnitAction::Idle,
            }
        }
        AttackerGoal::BreakWall(id) => {
            debug!(unit = %unit.id, wall = %id, "committing to break wall");
            unit.commitment = Some(Commitment::AttackWall(id));
            follow_commitment(unit, view).unwrap_or(UnitAction::Idle)
        }
        AttackerGoal::ThreadBreach(id) => {
            debug!(unit = %unit.id, breach = %id, "heading for breach");
            unit.commitment = Some(Commitment::ApproachBreach(id));
            match view.structures.get(id) {
                Some(breach) => UnitAction::MoveTo(breach.center()),
                None => UnitAction::Idle,
            }
        }
        AttackerGoal::Idle | AttackerGoal::EngageDefender(_) => UnitAction::Idle,
    }
}

/// Act on a persisted commitment, or drop it if it no longer applies.
fn follow_commitment(unit: &mut Unit, view: &WorldView<'_>) -> Option<UnitAction> {
    match unit.commitment? {
        Commitment::ApproachBreach(id) => match view.structures.get(id) {
            Some(breach) if breach.is_breached_wall() => {
                let center = breach.center();
                let radius = Fixed::from_num(view.config.breach_arrival_radius);
                if unit.position.distance_squared(center) < radius * radius {
                    debug!(unit = %unit.id, breach = %id, "reached breach");
                    unit.commitment = None;
                    Some(UnitAction::Idle)
                } else {
                    Some(UnitAction::MoveTo(center))
                }
            }
            _ => {
                unit.commitment = None;
                None
            }
        },
        Commitment::AttackWall(id) => match view.structures.get(id) {
            Some(wall) if wall.is_intact_wall() => {
                Some(engage(unit, TargetRef::Structure(id), wall.center()))
            }
            _ => {
                unit.commitment = None;
                None
            }
        },
    }
}

fn engage(unit: &mut Unit, target: TargetRef, point: Vec2Fixed) -> UnitAction {
    unit.target = Some(target);
    if unit.in_range_of(point) {
        UnitAction::Attack(target)
    } else {
        UnitAction::MoveTo(point)
    }
}

/// Where one step towards `destination` lands, honoring wall collision.
///
/// A step that would end inside an intact wall (edges included) is cancelled
/// for units the movement rules block.
#[must_use]
pub fn next_position(unit: &Unit, destination: Vec2Fixed, view: &WorldView<'_>) -> Vec2Fixed {
    let next = unit.step_towards(destination);

    let rules = view.config.movement;
    let blocked_side = match unit.allegiance {
        Allegiance::Defender => rules.defenders_blocked_by_walls,
        Allegiance::Attacker => rules.attackers_blocked_by_walls,
    };
    if blocked_side && view.intact_walls().any(|wall| wall.bounds.contains_point(next)) {
        return unit.position;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{StructureId, UnitId};
    use crate::structures::StructureKind;
    use crate::testing::Sandbox;
    use crate::units::UnitArchetype;

    fn plan_for(world: &Sandbox, id: UnitId) -> (Unit, UnitAction) {
        let mut unit = world.unit_ref(id).clone();
        let action = plan(&mut unit, &world.view());
        (unit, action)
    }

    #[test]
    fn test_attacker_walks_at_command_center() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 0);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(512, 384)));
        assert!(unit.target.is_some());
        assert!(unit.commitment.is_none());
    }

    #[test]
    fn test_attacker_attacks_command_center_in_range() {
        let mut world = Sandbox::new();
        let cc = world.command_center_at(448, 320);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 340);

        let (_, action) = plan_for(&world, id);
        assert_eq!(action, UnitAction::Attack(TargetRef::Structure(cc)));
    }

    #[test]
    fn test_blocked_attacker_commits_to_wall() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let wall = world.structure(StructureKind::Wall, 448, 128);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 40);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.commitment, Some(Commitment::AttackWall(wall)));
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(480, 160)));
    }

    #[test]
    fn test_wall_commitment_persists() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let committed = world.structure(StructureKind::Wall, 448, 128);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 480, 120);
        world.units.get_mut(id).unwrap().commitment = Some(Commitment::AttackWall(committed));
        // A wall added later that is now nearer on the line does not steal the unit.
        world.structure(StructureKind::Wall, 448, 64);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.commitment, Some(Commitment::AttackWall(committed)));
        assert_eq!(action, UnitAction::Attack(TargetRef::Structure(committed)));
    }

    #[test]
    fn test_stale_wall_commitment_dropped() {
        let mut world = Sandbox::new();
        let cc = world.command_center_at(448, 320);
        let wall = world.structure(StructureKind::Wall, 448, 128);
        world.breach(wall);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 40);
        world.units.get_mut(id).unwrap().commitment = Some(Commitment::AttackWall(wall));

        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.commitment, None);
        assert_eq!(unit.target, Some(TargetRef::Structure(cc)));
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(512, 384)));
    }

    #[test]
    fn test_breach_arrival_clears_and_idles() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let breach = world.structure(StructureKind::Wall, 448, 128);
        world.breach(breach);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 485, 165);
        world.units.get_mut(id).unwrap().commitment = Some(Commitment::ApproachBreach(breach));

        let (unit, action) = plan_for(&world, id);
        assert_eq!(action, UnitAction::Idle);
        assert_eq!(unit.commitment, None);
    }

    #[test]
    fn test_repaired_breach_commitment_dropped() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 40);
        world.units.get_mut(id).unwrap().commitment =
            Some(Commitment::ApproachBreach(StructureId(99)));

        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.commitment, None);
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(512, 384)));
    }

    #[test]
    fn test_defender_overrides_commitment_without_clearing() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let wall = world.structure(StructureKind::Wall, 448, 128);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 512, 40);
        world.units.get_mut(id).unwrap().commitment = Some(Commitment::AttackWall(wall));
        let defender = world.unit(UnitArchetype::Warrior, Allegiance::Defender, 540, 40);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(action, UnitAction::Attack(TargetRef::Unit(defender)));
        assert_eq!(unit.commitment, Some(Commitment::AttackWall(wall)));
    }

    #[test]
    fn test_defender_chases_attacker() {
        let mut world = Sandbox::new();
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Defender, 0, 0);
        let attacker = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 300, 0);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(300, 0)));
        assert_eq!(unit.target, Some(TargetRef::Unit(attacker)));
    }

    #[test]
    fn test_attacker_keeps_engaged_defender() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 100, 100);
        let engaged = world.unit(UnitArchetype::Warrior, Allegiance::Defender, 160, 100);
        world.units.get_mut(id).unwrap().target = Some(TargetRef::Unit(engaged));
        world.unit(UnitArchetype::Warrior, Allegiance::Defender, 110, 100);

        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.target, Some(TargetRef::Unit(engaged)));
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(160, 100)));
    }

    #[test]
    fn test_raider_keeps_standing_raid_target() {
        let mut world = Sandbox::new();
        world.command_center_at(448, 320);
        let first = world.structure(StructureKind::GoldMine, 256, 352);
        let id = world.unit(UnitArchetype::Giant, Allegiance::Attacker, 100, 384);

        let (unit, _) = plan_for(&world, id);
        assert_eq!(unit.target, Some(TargetRef::Structure(first)));
        world.units.get_mut(id).unwrap().target = unit.target;

        // A nearer mine on the same line does not pull the raider away.
        let nearer = world.structure(StructureKind::GoldMine, 160, 352);
        let (unit, _) = plan_for(&world, id);
        assert_eq!(unit.target, Some(TargetRef::Structure(first)));

        // Exhausted: pick again.
        world.breach(first);
        let (unit, action) = plan_for(&world, id);
        assert_eq!(unit.target, Some(TargetRef::Structure(nearer)));
        assert_eq!(action, UnitAction::MoveTo(Vec2Fixed::from_ints(192, 384)));
    }

    #[test]
    fn test_dead_target_is_replaced() {
        let mut world = Sandbox::new();
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Defender, 0, 0);
        let dead = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 20, 0);
        let other = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 300, 0);
        world.units.get_mut(id).unwrap().target = Some(TargetRef::Unit(dead));
        world.units.get_mut(dead).unwrap().health.current = 0;

        let (unit, _) = plan_for(&world, id);
        assert_eq!(unit.target, Some(TargetRef::Unit(other)));
    }

    #[test]
    fn test_defender_blocked_by_intact_wall() {
        let mut world = Sandbox::new();
        world.structure(StructureKind::Wall, 200, 0);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Defender, 199, 10);
        world.units.get_mut(id).unwrap().position.x = Fixed::from_num(199.5);
        let view = world.view();
        let unit = world.unit_ref(id);

        assert_eq!(
            next_position(unit, Vec2Fixed::from_ints(400, 10), &view),
            unit.position
        );
    }

    #[test]
    fn test_attacker_walks_through_wall_by_default() {
        let mut world = Sandbox::new();
        world.structure(StructureKind::Wall, 200, 0);
        let id = world.unit(UnitArchetype::Warrior, Allegiance::Attacker, 199, 10);
        world.units.get_mut(id).unwrap().position.x = Fixed::from_num(199.5);
        let unit = world.unit_ref(id).clone();

        let next = next_position(&unit, Vec2Fixed::from_ints(400, 10), &world.view());
        assert!(next.x > unit.position.x);

        world.config.movement.attackers_blocked_by_walls = true;
        assert_eq!(
            next_position(&unit, Vec2Fixed::from_ints(400, 10), &world.view()),
            unit.position
        );
    }
}

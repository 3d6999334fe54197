//! Property tests for obstruction geometry, target selection and placement.

use bastion_core::commands::PlayerCommand;
use bastion_core::config::Difficulty;
use bastion_core::geometry::{distance_to_line, line_intersects_rect};
use bastion_core::math::{Fixed, Vec2Fixed};
use bastion_core::structures::StructureKind;
use bastion_core::targeting::{select_attacker_goal, select_defender_target};
use bastion_core::units::UnitArchetype;
use bastion_test_utils::determinism::strategies::{
    arb_archetype, arb_cell, arb_coordinate, arb_position, arb_rect, arb_segment, arb_structure_kind,
};
use bastion_test_utils::fixtures::{arena, attacker, defender, fixed, standard_match, structure};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_intersection_ignores_direction((a, b) in arb_segment(), rect in arb_rect()) {
        prop_assert_eq!(
            line_intersects_rect(a, b, &rect),
            line_intersects_rect(b, a, &rect)
        );
    }

    #[test]
    fn prop_disjoint_bounding_box_never_intersects((a, b) in arb_segment(), rect in arb_rect()) {
        let disjoint = a.x.max(b.x) < rect.left()
            || a.x.min(b.x) > rect.right()
            || a.y.max(b.y) < rect.top()
            || a.y.min(b.y) > rect.bottom();
        prop_assume!(disjoint);
        prop_assert!(!line_intersects_rect(a, b, &rect));
    }

    #[test]
    fn prop_segment_from_inside_intersects(rect in arb_rect(), far in arb_position()) {
        let center = rect.center();
        prop_assert!(line_intersects_rect(center, far, &rect));
        prop_assert!(line_intersects_rect(far, center, &rect));
    }

    #[test]
    fn prop_segment_crossing_interior_intersects(
        rect in arb_rect(),
        y_offset in arb_coordinate(1),
    ) {
        // Horizontal line through the rect, clamped to its interior rows.
        let y = (rect.top() + y_offset).min(rect.bottom());
        let a = Vec2Fixed::new(rect.left() - fixed(10), y);
        let b = Vec2Fixed::new(rect.right() + fixed(10), y);
        prop_assert!(line_intersects_rect(a, b, &rect));
    }

    #[test]
    fn prop_distance_to_line_symmetric((p0, p1) in arb_segment(), point in arb_position()) {
        prop_assert_eq!(distance_to_line(p0, p1, point), distance_to_line(p1, p0, point));
        prop_assert!(distance_to_line(p0, p1, point) >= Fixed::ZERO);
        prop_assert_eq!(distance_to_line(p0, p1, p0), Fixed::ZERO);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_target_selection_is_idempotent(
        archetype in arb_archetype(),
        (ax, ay) in (0i32..1024, 0i32..768),
        (dx, dy) in (0i32..1024, 0i32..768),
        wall in arb_cell(),
    ) {
        let mut game = arena();
        structure(&mut game, StructureKind::Wall, wall.col * 64, wall.row * 64);
        structure(&mut game, StructureKind::GoldMine, 256, 384);
        let a = attacker(&mut game, archetype, ax, ay);
        let d = defender(&mut game, UnitArchetype::Warrior, dx, dy);

        let view = game.view();
        let unit = game.unit(a).unwrap();
        let first = select_attacker_goal(unit, &view);
        prop_assert_eq!(first, select_attacker_goal(unit, &view));

        let guard = game.unit(d).unwrap();
        prop_assert_eq!(select_defender_target(guard, &view), Some(a));
        prop_assert_eq!(select_defender_target(guard, &view), Some(a));
    }

    #[test]
    fn prop_rejected_placement_changes_nothing(
        difficulty in prop_oneof![Just(Difficulty::Easy), Just(Difficulty::Hard)],
        kind in arb_structure_kind(),
        cell in arb_cell(),
    ) {
        let mut game = standard_match(difficulty, 0);
        let gold = game.gold();
        let hash = game.state_hash();

        match game.apply_command(PlayerCommand::PlaceStructure { kind, cell }) {
            Ok(_) => {
                let cost = game.config().spec(kind).cost;
                prop_assert_eq!(game.gold(), gold - cost);
                prop_assert_eq!(game.structures().len(), 38);
            }
            Err(_) => {
                prop_assert_eq!(game.gold(), gold);
                prop_assert_eq!(game.state_hash(), hash);
            }
        }
    }
}

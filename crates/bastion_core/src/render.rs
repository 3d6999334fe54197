//! Presentation boundary.
//!
//! The core never draws. Once per frame [`Match::render`] walks the
//! structures and then the units in id order and hands each one to a
//! [`RenderSink`] as a plain view value.

use serde::{Deserialize, Serialize};

use crate::components::{Allegiance, Health, StructureId, TargetRef, UnitId};
use crate::geometry::Rect;
use crate::math::{Fixed, Vec2Fixed};
use crate::simulation::{Match, MatchPhase};
use crate::structures::{Structure, StructureKind};
use crate::units::{Unit, UnitArchetype};

/// How an entity should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualTag {
    /// Command center.
    CommandCenter,
    /// Barracks.
    Barracks,
    /// Gold mine with health left.
    GoldMine,
    /// Gold mine at zero health.
    GoldMineExhausted,
    /// Standing wall.
    Wall,
    /// Wall at zero health.
    WallBreached,
    /// A unit.
    Unit {
        /// Combat class.
        archetype: UnitArchetype,
        /// Side.
        allegiance: Allegiance,
    },
}

/// Per-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Tick the frame shows.
    pub tick: u64,
    /// Phase.
    pub phase: MatchPhase,
    /// Gold in the pool.
    pub gold: u32,
    /// Waves released so far.
    pub waves_launched: u32,
    /// Map width in world units.
    pub map_width: u32,
    /// Map height in world units.
    pub map_height: u32,
}

/// A structure as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureView {
    /// Identity.
    pub id: StructureId,
    /// World-space footprint.
    pub bounds: Rect,
    /// Look.
    pub tag: VisualTag,
    /// Health.
    pub health: Health,
    /// Currently selected by the player.
    pub selected: bool,
}

/// A unit as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    /// Identity.
    pub id: UnitId,
    /// World position.
    pub position: Vec2Fixed,
    /// Body radius.
    #[serde(with = "crate::math::fixed_serde")]
    pub radius: Fixed,
    /// Look.
    pub tag: VisualTag,
    /// Health.
    pub health: Health,
    /// Where the unit's attack line points, if it has a live target.
    pub target_position: Option<Vec2Fixed>,
}

/// Receiver for one frame of entity views.
pub trait RenderSink {
    /// Called before any entity of a frame.
    fn begin_frame(&mut self, _frame: &FrameInfo) {}
    /// One structure.
    fn structure(&mut self, view: &StructureView);
    /// One unit.
    fn unit(&mut self, view: &UnitView);
    /// Called after the last entity of a frame.
    fn end_frame(&mut self) {}
}

/// Visual tag for a structure.
#[must_use]
pub fn structure_tag(structure: &Structure) -> VisualTag {
    match (structure.kind(), structure.is_standing()) {
        (StructureKind::CommandCenter, _) => VisualTag::CommandCenter,
        (StructureKind::Barracks, _) => VisualTag::Barracks,
        (StructureKind::GoldMine, true) => VisualTag::GoldMine,
        (StructureKind::GoldMine, false) => VisualTag::GoldMineExhausted,
        (StructureKind::Wall, true) => VisualTag::Wall,
        (StructureKind::Wall, false) => VisualTag::WallBreached,
    }
}

impl Match {
    /// Feed the current state to `sink`.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.begin_frame(&FrameInfo {
            tick: self.current_tick(),
            phase: self.phase(),
            gold: self.gold(),
            waves_launched: self.waves_launched(),
            map_width: self.config().map_width,
            map_height: self.config().map_height,
        });

        for structure in self.structures().values() {
            sink.structure(&StructureView {
                id: structure.id,
                bounds: structure.bounds,
                tag: structure_tag(structure),
                health: structure.health,
                selected: self.selection() == Some(structure.id),
            });
        }

        for unit in self.units().values().filter(|u| u.is_alive()) {
            sink.unit(&UnitView {
                id: unit.id,
                position: unit.position,
                radius: unit.stats.radius,
                tag: VisualTag::Unit {
                    archetype: unit.archetype,
                    allegiance: unit.allegiance,
                },
                health: unit.health,
                target_position: self.target_position(unit),
            });
        }

        sink.end_frame();
    }

    fn target_position(&self, unit: &Unit) -> Option<Vec2Fixed> {
        match unit.target? {
            TargetRef::Unit(id) => self
                .unit(id)
                .filter(|target| target.is_alive())
                .map(|target| target.position),
            TargetRef::Structure(id) => self
                .structure(id)
                .filter(|target| target.is_standing())
                .map(Structure::center),
        }
    }
}

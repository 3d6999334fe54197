//! Hand-built worlds for unit tests of the AI modules.

use crate::components::{Allegiance, StructureId, UnitId};
use crate::config::MatchConfig;
use crate::math::Vec2Fixed;
use crate::structures::{Structure, StructureKind};
use crate::units::{StatOverrides, Unit, UnitArchetype};
use crate::world::{StructureStorage, UnitStorage, WorldView};

pub(crate) struct Sandbox {
    pub config: MatchConfig,
    pub units: UnitStorage,
    pub structures: StructureStorage,
    pub command_center: Option<StructureId>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            config: MatchConfig::default(),
            units: UnitStorage::new(),
            structures: StructureStorage::new(),
            command_center: None,
        }
    }

    /// Command center with its top-left corner at `(x, y)`.
    pub fn command_center_at(&mut self, x: i32, y: i32) -> StructureId {
        let id = self.structure(StructureKind::CommandCenter, x, y);
        self.command_center = Some(id);
        id
    }

    pub fn structure(&mut self, kind: StructureKind, x: i32, y: i32) -> StructureId {
        let config = &self.config;
        self.structures
            .insert_with(|id| Structure::new(id, kind, Vec2Fixed::from_ints(x, y), config))
    }

    pub fn breach(&mut self, id: StructureId) {
        if let Some(structure) = self.structures.get_mut(id) {
            structure.health.current = 0;
        }
    }

    pub fn unit(&mut self, archetype: UnitArchetype, allegiance: Allegiance, x: i32, y: i32) -> UnitId {
        let stats = *self.config.archetypes.get(archetype);
        self.units.insert_with(|id| {
            Unit::new(
                id,
                archetype,
                allegiance,
                Vec2Fixed::from_ints(x, y),
                &stats,
                StatOverrides::default(),
            )
        })
    }

    pub fn unit_ref(&self, id: UnitId) -> &Unit {
        self.units.get(id).expect("unit exists")
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            units: &self.units,
            structures: &self.structures,
            config: &self.config,
            command_center: self.command_center,
        }
    }
}

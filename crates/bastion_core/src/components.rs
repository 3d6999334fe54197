//! Shared building blocks for units and structures.
//!
//! Entities refer to each other only through [`UnitId`] and [`StructureId`].
//! A reference is never trusted across ticks: callers look the id up again
//! and treat a missing or dead referent as "no target".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a unit. Assigned in increasing order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Identity of a structure. Assigned in increasing order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructureId(pub u32);

impl From<u32> for UnitId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<u32> for StructureId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Something a unit can attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// Another unit.
    Unit(UnitId),
    /// A structure.
    Structure(StructureId),
}

/// Which side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allegiance {
    /// Spawned by the player's barracks.
    Defender,
    /// Spawned by the wave director.
    Attacker,
}

impl Allegiance {
    /// The side this one fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Defender => Self::Attacker,
            Self::Attacker => Self::Defender,
        }
    }
}

/// Health component.
///
/// `current` never exceeds `max` and never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }
}

/// Structure size in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Footprint {
    /// Create a footprint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square footprint.
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Grid cell coordinate (column, row). Cell `(0, 0)` starts at the map origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
}

impl GridCell {
    /// Create a cell coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

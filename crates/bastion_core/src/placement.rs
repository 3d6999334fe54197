//! Structure placement validation.
//!
//! A placement is valid when the footprint lies inside the build area (the
//! map inset by the border on every side) and overlaps no existing structure.
//! Breached walls still occupy their cells.

use crate::components::{Footprint, GridCell, StructureId};
use crate::config::MatchConfig;
use crate::geometry::Rect;
use crate::math::{Fixed, Vec2Fixed};
use crate::structures::Structure;

// ============================================================================
// Grid helpers
// ============================================================================

/// World position of a cell's top-left corner.
#[must_use]
pub fn cell_origin(cell: GridCell, config: &MatchConfig) -> Vec2Fixed {
    let size = config.cell_size as i32;
    Vec2Fixed::from_ints(cell.col * size, cell.row * size)
}

/// World rectangle a footprint covers when anchored at `cell`.
#[must_use]
pub fn footprint_rect(cell: GridCell, footprint: Footprint, config: &MatchConfig) -> Rect {
    let size = Fixed::from_num(config.cell_size);
    Rect::new(
        cell_origin(cell, config),
        size * Fixed::from_num(footprint.width),
        size * Fixed::from_num(footprint.height),
    )
}

/// The area structures may be placed in.
#[must_use]
pub fn build_area(config: &MatchConfig) -> Rect {
    let border = config.border as i32;
    Rect::from_ints(
        border,
        border,
        config.map_width as i32 - 2 * border,
        config.map_height as i32 - 2 * border,
    )
}

// ============================================================================
// Placement Validation
// ============================================================================

/// Result of placement validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementResult {
    /// Placement is valid.
    Valid,
    /// Footprint leaves the build area.
    OutOfBounds,
    /// Footprint overlaps an existing structure (the first one found).
    Overlaps(StructureId),
}

impl PlacementResult {
    /// Check if placement is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PlacementResult::Valid)
    }
}

/// Validate a candidate footprint against the build area and `existing`.
#[must_use]
pub fn check_placement<'a>(
    rect: &Rect,
    config: &MatchConfig,
    existing: impl IntoIterator<Item = &'a Structure>,
) -> PlacementResult {
    if !build_area(config).contains_rect(rect) {
        return PlacementResult::OutOfBounds;
    }

    existing
        .into_iter()
        .find(|structure| structure.bounds.overlaps(rect))
        .map_or(PlacementResult::Valid, |structure| {
            PlacementResult::Overlaps(structure.id)
        })
}

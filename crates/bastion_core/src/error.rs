//! Error types for the match simulation.

use thiserror::Error;

use crate::components::{StructureId, UnitId};
use crate::simulation::MatchPhase;
use crate::structures::StructureKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for rejected commands and bad data.
///
/// Every command that returns one of these has left the match untouched.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid unit identifier.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Invalid structure identifier.
    #[error("Structure not found: {0}")]
    StructureNotFound(StructureId),

    /// Insufficient gold in the shared pool.
    #[error("Insufficient gold: need {required}, have {available}")]
    InsufficientResources {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Placement would leave the build area.
    #[error("Placement is outside the build area")]
    PlacementOutOfBounds,

    /// Placement would overlap an existing structure.
    #[error("Placement overlaps structure {0}")]
    PlacementOverlap(StructureId),

    /// This structure kind cannot be placed by the player.
    #[error("{0:?} cannot be placed")]
    NotPlaceable(StructureKind),

    /// A command needed a selected structure and none is selected.
    #[error("No structure selected")]
    NoSelection,

    /// The selected structure is of the wrong kind for this command.
    #[error("Structure {id} is a {found:?}, expected {expected:?}")]
    WrongStructureKind {
        /// Selected structure.
        id: StructureId,
        /// Kind the command works on.
        expected: StructureKind,
        /// Kind actually selected.
        found: StructureKind,
    },

    /// Repair requested for a structure that is not at zero health.
    #[error("Structure {0} cannot be repaired")]
    NotRepairable(StructureId),

    /// Command not allowed in the current phase.
    #[error("{action} is not allowed during {phase:?}")]
    InvalidPhase {
        /// Phase the match is in.
        phase: MatchPhase,
        /// Rejected action.
        action: &'static str,
    },

    /// Zero or otherwise meaningless amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(u32),

    /// Data file parsing error.
    #[error("Failed to parse match data: {0}")]
    DataParseError(String),

    /// Snapshot encode/decode failure.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid match state.
    #[error("Invalid match state: {0}")]
    InvalidState(String),
}

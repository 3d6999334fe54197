//! # Bastion Core
//!
//! Deterministic simulation core for a grid-based base-defense game: the
//! player builds around a command center, then autonomous defenders and
//! waves of attackers fight it out.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering (see [`render::RenderSink`])
//! - No IO
//! - No system randomness (waves use a seeded in-match RNG)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`geometry`] - Line-of-sight tests against axis-aligned rectangles
//! - [`combat`] - Cooldown-gated damage resolution
//! - [`targeting`] - Target selection for defenders and attackers
//! - [`navigation`] - Per-unit planning, breach commitments, wall collision
//! - [`simulation`] - The match state and tick loop
//! - [`commands`] - Player commands and their validation
//! - [`waves`] - Wave composition and spawn placement
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod commands;
pub mod components;
pub mod config;
pub mod economy;
pub mod error;
pub mod geometry;
pub mod math;
pub mod navigation;
pub mod placement;
pub mod render;
pub mod simulation;
pub mod structures;
pub mod targeting;
pub mod units;
pub mod waves;
pub mod world;

#[cfg(test)]
mod testing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::DamageEvent;
    pub use crate::commands::{CommandOutcome, PlayerCommand};
    pub use crate::components::*;
    pub use crate::config::{ArchetypeStats, Difficulty, MatchConfig, MovementRules};
    pub use crate::error::{GameError, Result};
    pub use crate::geometry::{line_intersects_rect, Rect};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::render::{FrameInfo, RenderSink, StructureView, UnitView, VisualTag};
    pub use crate::simulation::{Match, MatchPhase, TickEvents, DEFAULT_TICK_MS};
    pub use crate::structures::{Structure, StructureKind};
    pub use crate::units::{Commitment, StatOverrides, Unit, UnitArchetype};
}

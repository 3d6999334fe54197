//! Discrete player commands.
//!
//! The input layer translates pointer and key events into [`PlayerCommand`]s.
//! [`Match::apply_command`] validates a command completely before touching
//! any state: it either applies in full or returns a [`GameError`] with the
//! match unchanged.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::components::{GridCell, StructureId};
use crate::error::{GameError, Result};
use crate::placement::{check_placement, footprint_rect, PlacementResult};
use crate::simulation::{Match, MatchPhase, TickEvents};
use crate::structures::{Structure, StructureKind};

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Buy and place a structure with its top-left corner at `cell`.
    PlaceStructure {
        /// Structure to build.
        kind: StructureKind,
        /// Anchor cell.
        cell: GridCell,
    },
    /// Make a structure the target of fund and repair commands.
    SelectStructure(StructureId),
    /// Clear the selection.
    CancelSelection,
    /// Move gold from the shared pool into the selected barracks.
    FundStructure {
        /// Gold to move.
        amount: u32,
    },
    /// Rebuild the selected structure if it is at zero health.
    RepairStructure,
    /// End the build phase now.
    AdvanceBuildPhase,
}

/// What an accepted command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// New structure.
    Placed(StructureId),
    /// Selection set.
    Selected(StructureId),
    /// Selection cleared.
    SelectionCleared,
    /// Barracks reserve after funding.
    Funded {
        /// Funded barracks.
        id: StructureId,
        /// Reserve after the transfer.
        reserve: u32,
    },
    /// Structure rebuilt under a new id.
    Repaired {
        /// Id of the ruin that was replaced.
        old: StructureId,
        /// Id of the fresh structure.
        new: StructureId,
    },
    /// Battle started and the first wave was released.
    BattleStarted {
        /// Attackers in the first wave.
        attackers: usize,
    },
}

impl Match {
    /// Validate and apply a player command.
    ///
    /// # Errors
    ///
    /// Returns the reason the command was rejected. A rejected command
    /// leaves the match untouched.
    pub fn apply_command(&mut self, command: PlayerCommand) -> Result<CommandOutcome> {
        let outcome = match command {
            PlayerCommand::PlaceStructure { kind, cell } => self.place_structure(kind, cell),
            PlayerCommand::SelectStructure(id) => self.select_structure(id),
            PlayerCommand::CancelSelection => {
                self.selection = None;
                Ok(CommandOutcome::SelectionCleared)
            }
            PlayerCommand::FundStructure { amount } => self.fund_structure(amount),
            PlayerCommand::RepairStructure => self.repair_structure(),
            PlayerCommand::AdvanceBuildPhase => self.advance_build_phase(),
        };

        match &outcome {
            Ok(result) => debug!(?command, ?result, "Command applied"),
            Err(error) => debug!(?command, %error, "Command rejected"),
        }
        outcome
    }

    fn require_phase(&self, allowed: &[MatchPhase], action: &'static str) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                phase: self.phase,
                action,
            })
        }
    }

    fn selected(&self) -> Result<&Structure> {
        let id = self.selection.ok_or(GameError::NoSelection)?;
        self.structures
            .get(id)
            .ok_or(GameError::StructureNotFound(id))
    }

    fn place_structure(&mut self, kind: StructureKind, cell: GridCell) -> Result<CommandOutcome> {
        self.require_phase(&[MatchPhase::Build], "place structure")?;
        if !kind.is_placeable() {
            return Err(GameError::NotPlaceable(kind));
        }

        let spec = *self.config.spec(kind);
        let rect = footprint_rect(cell, spec.footprint, &self.config);
        match check_placement(&rect, &self.config, self.structures.values()) {
            PlacementResult::Valid => {}
            PlacementResult::OutOfBounds => return Err(GameError::PlacementOutOfBounds),
            PlacementResult::Overlaps(other) => return Err(GameError::PlacementOverlap(other)),
        }

        self.treasury.spend(spec.cost)?;
        let id = self.spawn_structure(kind, rect.origin);
        info!(structure = %id, ?kind, col = cell.col, row = cell.row, gold = self.gold(), "Structure placed");
        Ok(CommandOutcome::Placed(id))
    }

    fn select_structure(&mut self, id: StructureId) -> Result<CommandOutcome> {
        if !self.structures.contains(id) {
            return Err(GameError::StructureNotFound(id));
        }
        self.selection = Some(id);
        Ok(CommandOutcome::Selected(id))
    }

    fn fund_structure(&mut self, amount: u32) -> Result<CommandOutcome> {
        self.require_phase(&[MatchPhase::Build, MatchPhase::Battle], "fund structure")?;
        if amount == 0 {
            return Err(GameError::InvalidAmount(amount));
        }

        let selected = self.selected()?;
        let id = selected.id;
        if selected.kind() != StructureKind::Barracks {
            return Err(GameError::WrongStructureKind {
                id,
                expected: StructureKind::Barracks,
                found: selected.kind(),
            });
        }

        self.treasury.spend(amount)?;
        let reserve = match self.structures.get_mut(id) {
            Some(barracks) => {
                barracks.add_reserve(amount);
                barracks.reserve().unwrap_or_default()
            }
            None => 0,
        };
        info!(structure = %id, amount, reserve, "Barracks funded");
        Ok(CommandOutcome::Funded { id, reserve })
    }

    fn repair_structure(&mut self) -> Result<CommandOutcome> {
        self.require_phase(&[MatchPhase::Build, MatchPhase::Battle], "repair structure")?;

        let selected = self.selected()?;
        let old = selected.id;
        let kind = selected.kind();
        let origin = selected.bounds.origin;
        let cost = selected
            .repair_cost(&self.config)
            .ok_or(GameError::NotRepairable(old))?;

        self.treasury.spend(cost)?;
        self.structures.remove(old);
        let new = self.spawn_structure(kind, origin);
        self.selection = Some(new);
        info!(old = %old, new = %new, ?kind, cost, "Structure rebuilt");
        Ok(CommandOutcome::Repaired { old, new })
    }

    fn advance_build_phase(&mut self) -> Result<CommandOutcome> {
        self.require_phase(&[MatchPhase::Build], "advance build phase")?;
        let mut events = TickEvents::default();
        self.start_battle(&mut events);
        Ok(CommandOutcome::BattleStarted {
            attackers: events.spawned.len(),
        })
    }
}

//! Shared gold pool.
//!
//! All calculations use integer math. Every debit checks affordability in the
//! same call, so the pool can never go negative.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// The player's gold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Treasury {
    gold: u32,
}

impl Treasury {
    /// Create a pool holding `gold`.
    #[must_use]
    pub const fn new(gold: u32) -> Self {
        Self { gold }
    }

    /// Current balance.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Check if the pool covers a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    /// Debit `amount` if affordable; otherwise leave the pool untouched.
    pub fn spend(&mut self, amount: u32) -> Result<()> {
        if !self.can_afford(amount) {
            return Err(GameError::InsufficientResources {
                required: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Credit the pool.
    pub fn deposit(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }
}

//! Per-participant balance record.

use crate::error::StakingError;
use serde::{Deserialize, Serialize};

/// Deposited funds and the locked portion of them.
///
/// Invariant: `locked <= balance`. Every mutator preserves it and leaves the
/// record untouched on error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u128,
    pub locked: u128,
}

impl Account {
    /// The withdrawable portion.
    pub fn available(&self) -> u128 {
        self.balance - self.locked
    }

    pub fn credit(&mut self, amount: u128) -> Result<(), StakingError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: u128) -> Result<(), StakingError> {
        let available = self.available();
        if amount > available {
            return Err(StakingError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn lock(&mut self, amount: u128) -> Result<(), StakingError> {
        let available = self.available();
        if amount > available {
            return Err(StakingError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.locked += amount;
        Ok(())
    }

    pub fn unlock(&mut self, amount: u128) -> Result<(), StakingError> {
        if amount > self.locked {
            return Err(StakingError::InsufficientLocked {
                needed: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        Ok(())
    }
}

//! Core staking ledger.

use crate::account::Account;
use crate::error::StakingError;
use serde::{Deserialize, Serialize};
use stakegov_registry::{is_governance, Registry};
use stakegov_types::Address;
use std::collections::BTreeMap;

/// Scale at which weights read as a 0–100 percentage.
pub const DEFAULT_WEIGHT_SCALE: u128 = 100;

/// Participant balances and the collateral locked behind them.
///
/// Accounts are created on first deposit and never removed; a drained
/// account simply holds zero. `total_locked` is kept in step with the
/// per-account locks so weight queries are O(1).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakingLedger {
    accounts: BTreeMap<Address, Account>,
    total_locked: u128,
}

impl StakingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to the caller's own account.
    pub fn deposit(&mut self, caller: &Address, amount: u128) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        if caller.is_zero() {
            return Err(StakingError::NullParticipant);
        }
        let account = self.accounts.entry(*caller).or_default();
        account.credit(amount)?;
        tracing::info!(participant = %caller, amount, balance = account.balance, "deposit");
        Ok(())
    }

    /// Withdraw from the caller's available (unlocked) balance.
    pub fn withdraw(&mut self, caller: &Address, amount: u128) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let account = self
            .accounts
            .get_mut(caller)
            .ok_or(StakingError::InsufficientBalance {
                needed: amount,
                available: 0,
            })?;
        account.debit(amount)?;
        tracing::info!(participant = %caller, amount, balance = account.balance, "withdraw");
        Ok(())
    }

    /// Lock `amount` of `participant`'s available balance as collateral.
    /// Governance engine only.
    pub fn lock(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        participant: &Address,
        amount: u128,
    ) -> Result<(), StakingError> {
        ensure_governance(registry, caller)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let new_total = self
            .total_locked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let account = self
            .accounts
            .get_mut(participant)
            .ok_or(StakingError::InsufficientBalance {
                needed: amount,
                available: 0,
            })?;
        account.lock(amount)?;
        self.total_locked = new_total;
        tracing::debug!(%participant, amount, locked = account.locked, "collateral locked");
        Ok(())
    }

    /// Release `amount` of `participant`'s locked collateral. Governance engine only.
    pub fn unlock(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        participant: &Address,
        amount: u128,
    ) -> Result<(), StakingError> {
        ensure_governance(registry, caller)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let account = self
            .accounts
            .get_mut(participant)
            .ok_or(StakingError::InsufficientLocked {
                needed: amount,
                locked: 0,
            })?;
        account.unlock(amount)?;
        // Per-account locks sum to total_locked, so this cannot underflow.
        self.total_locked -= amount;
        tracing::debug!(%participant, amount, locked = account.locked, "collateral unlocked");
        Ok(())
    }

    /// `floor(locked(participant) × scale / total_locked)`; zero when nothing
    /// is locked or the participant is unknown.
    pub fn calc_voting_weight(&self, participant: &Address, scale: u128) -> u128 {
        let locked = self.locked_balance_of(participant);
        if self.total_locked == 0 || locked == 0 {
            return 0;
        }
        proportion(locked, self.total_locked, scale)
    }

    /// Locked collateral summed over `electorate`.
    pub fn locked_among(&self, electorate: &[Address]) -> u128 {
        electorate
            .iter()
            .map(|p| self.locked_balance_of(p))
            .fold(0u128, u128::saturating_add)
    }

    /// Like [`calc_voting_weight`](Self::calc_voting_weight), but measured
    /// against the collateral of `electorate` only. Zero for a participant
    /// outside it.
    pub fn calc_voting_weight_among(
        &self,
        participant: &Address,
        scale: u128,
        electorate: &[Address],
    ) -> u128 {
        if !electorate.contains(participant) {
            return 0;
        }
        let whole = self.locked_among(electorate);
        let locked = self.locked_balance_of(participant);
        if whole == 0 || locked == 0 {
            return 0;
        }
        proportion(locked, whole, scale)
    }

    /// Weight at [`DEFAULT_WEIGHT_SCALE`].
    pub fn voting_weight(&self, participant: &Address) -> u128 {
        self.calc_voting_weight(participant, DEFAULT_WEIGHT_SCALE)
    }

    pub fn balance_of(&self, participant: &Address) -> u128 {
        self.accounts
            .get(participant)
            .map(|a| a.balance)
            .unwrap_or(0)
    }

    pub fn locked_balance_of(&self, participant: &Address) -> u128 {
        self.accounts
            .get(participant)
            .map(|a| a.locked)
            .unwrap_or(0)
    }

    pub fn available_balance_of(&self, participant: &Address) -> u128 {
        self.accounts
            .get(participant)
            .map(Account::available)
            .unwrap_or(0)
    }

    pub fn account(&self, participant: &Address) -> Option<&Account> {
        self.accounts.get(participant)
    }

    pub fn total_locked(&self) -> u128 {
        self.total_locked
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Serialize the ledger for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, StakingError> {
        bincode::serialize(self).map_err(|e| StakingError::Snapshot(e.to_string()))
    }

    /// Restore a ledger, recomputing `total_locked` from the accounts.
    pub fn load_state(data: &[u8]) -> Result<Self, StakingError> {
        let mut ledger: Self =
            bincode::deserialize(data).map_err(|e| StakingError::Snapshot(e.to_string()))?;
        let mut total: u128 = 0;
        for account in ledger.accounts.values() {
            if account.locked > account.balance {
                return Err(StakingError::Snapshot(
                    "account locks more than its balance".to_string(),
                ));
            }
            total = total
                .checked_add(account.locked)
                .ok_or(StakingError::Overflow)?;
        }
        ledger.total_locked = total;
        Ok(ledger)
    }
}

fn ensure_governance(registry: &dyn Registry, caller: &Address) -> Result<(), StakingError> {
    if !is_governance(registry, caller) {
        return Err(StakingError::Unauthorized(*caller));
    }
    Ok(())
}

/// `floor(part × scale / whole)` for `part <= whole`, exact for every input.
///
/// The product is formed in 256 bits, so the quotient never exceeds `scale`
/// and per-participant truncation is the only rounding.
fn proportion(part: u128, whole: u128, scale: u128) -> u128 {
    if whole == 0 {
        return 0;
    }
    if let Some(product) = part.checked_mul(scale) {
        return product / whole;
    }
    let (hi, lo) = widening_mul(part, scale);
    div_wide(hi, lo, whole)
}

/// Full 256-bit product as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a1, a0) = (a >> 64, a & MASK);
    let (b1, b0) = (b >> 64, b & MASK);

    let ll = a0 * b0;
    let lh = a0 * b1;
    let hl = a1 * b0;
    let hh = a1 * b1;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor((hi·2¹²⁸ + lo) / divisor)` by shift-subtract. The caller guarantees
/// the quotient fits in 128 bits.
fn div_wide(hi: u128, lo: u128, divisor: u128) -> u128 {
    let mut quotient = 0u128;
    let mut rem = 0u128;
    for i in (0..256).rev() {
        let bit = if i >= 128 {
            (hi >> (i - 128)) & 1
        } else {
            (lo >> i) & 1
        };
        let carry = rem >> 127;
        rem = (rem << 1) | bit;
        quotient <<= 1;
        if carry == 1 || rem >= divisor {
            rem = rem.wrapping_sub(divisor);
            quotient |= 1;
        }
    }
    quotient
}

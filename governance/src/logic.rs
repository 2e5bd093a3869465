//! Swappable decision policy.
//!
//! The engine holds only the identity of its current logic; the catalog maps
//! identities to implementations. An accepted ChangeGov ballot swaps the
//! identity without touching members, ballots or the ledger.

use serde::{Deserialize, Serialize};
use stakegov_ballot::BallotState;
use stakegov_types::Address;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Running weights of a ballot against the weight of all current members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub accepts: u128,
    pub rejects: u128,
    pub total: u128,
}

pub trait GovernanceLogic: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The terminal state the tally has reached, if any.
    fn decide(&self, tally: &Tally) -> Option<BallotState>;
}

/// Either side strictly exceeding half of the total finalizes the ballot.
#[derive(Clone, Copy, Debug, Default)]
pub struct MajorityLogic;

impl GovernanceLogic for MajorityLogic {
    fn name(&self) -> &str {
        "majority"
    }

    fn decide(&self, tally: &Tally) -> Option<BallotState> {
        // a > t/2 (floored) is exactly 2a > t for integers.
        let half = tally.total / 2;
        if tally.accepts > half {
            Some(BallotState::Accepted)
        } else if tally.rejects > half {
            Some(BallotState::Rejected)
        } else {
            None
        }
    }
}

/// Either side reaching `threshold_bps` of the total finalizes the ballot.
#[derive(Clone, Copy, Debug)]
pub struct SupermajorityLogic {
    pub threshold_bps: u32,
}

impl SupermajorityLogic {
    pub const MAX_BPS: u32 = 10_000;

    /// `None` unless `threshold_bps` is above one half and at most 100%.
    pub fn new(threshold_bps: u32) -> Option<Self> {
        (threshold_bps > Self::MAX_BPS / 2 && threshold_bps <= Self::MAX_BPS)
            .then_some(Self { threshold_bps })
    }

    fn reaches(&self, power: u128, total: u128) -> bool {
        power.saturating_mul(u128::from(Self::MAX_BPS))
            >= total.saturating_mul(u128::from(self.threshold_bps))
    }
}

impl GovernanceLogic for SupermajorityLogic {
    fn name(&self) -> &str {
        "supermajority"
    }

    fn decide(&self, tally: &Tally) -> Option<BallotState> {
        if tally.total == 0 {
            return None;
        }
        if self.reaches(tally.accepts, tally.total) {
            Some(BallotState::Accepted)
        } else if self.reaches(tally.rejects, tally.total) {
            Some(BallotState::Rejected)
        } else {
            None
        }
    }
}

/// Registered logic implementations by identity.
#[derive(Clone, Debug, Default)]
pub struct LogicCatalog {
    logics: HashMap<Address, Arc<dyn GovernanceLogic>>,
}

impl LogicCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `logic` under `identity`, returning what it replaced.
    pub fn register(
        &mut self,
        identity: Address,
        logic: Arc<dyn GovernanceLogic>,
    ) -> Option<Arc<dyn GovernanceLogic>> {
        self.logics.insert(identity, logic)
    }

    pub fn get(&self, identity: &Address) -> Option<&Arc<dyn GovernanceLogic>> {
        self.logics.get(identity)
    }

    pub fn contains(&self, identity: &Address) -> bool {
        self.logics.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.logics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logics.is_empty()
    }
}

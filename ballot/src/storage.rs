//! The ballot store.

use crate::ballot::{
    Ballot, BallotHeader, BallotId, BallotPayload, BallotPeriod, BallotState, BallotType,
    MemberBallotDetail, MemberProposal, VariableBallotDetail,
};
use crate::error::BallotError;
use crate::vote::{Decision, Vote, VoteId};
use serde::{Deserialize, Serialize};
use stakegov_registry::{is_governance, Registry};
use stakegov_types::{domain, Address, Timestamp, VarType};
use std::collections::BTreeMap;

/// Ballots, votes and the per-ballot voter index of one store instance.
///
/// Stores form an append-only chain: a successor records its predecessor via
/// [`set_previous_ballot_storage`](Self::set_previous_ballot_storage), and the
/// predecessor disables itself as soon as the registry points elsewhere.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BallotStorage {
    address: Address,
    owner: Address,
    previous: Option<Address>,
    ballots: BTreeMap<BallotId, Ballot>,
    votes: BTreeMap<VoteId, Vote>,
    /// Derived from `votes`; rebuilt on load.
    #[serde(skip)]
    voted: BTreeMap<(BallotId, Address), VoteId>,
    /// Open between [`checkpoint`](Self::checkpoint) and commit/rollback.
    #[serde(skip)]
    journal: Option<Vec<Undo>>,
}

/// Inverse of one mutation made under a checkpoint.
#[derive(Clone, Debug)]
enum Undo {
    Created(BallotId),
    Changed(Ballot),
    Voted {
        vote_id: VoteId,
        ballot_id: BallotId,
        voter: Address,
    },
}

impl BallotStorage {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            previous: None,
            ballots: BTreeMap::new(),
            votes: BTreeMap::new(),
            voted: BTreeMap::new(),
            journal: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn previous_ballot_storage(&self) -> Option<Address> {
        self.previous
    }

    /// Whether the registry now designates a different ballot storage.
    pub fn is_disabled(&self, registry: &dyn Registry) -> bool {
        let current = registry.resolve(domain::BALLOT_STORAGE);
        !current.is_zero() && current != self.address
    }

    /// Link this store to the instance it replaces. Owner only, once.
    pub fn set_previous_ballot_storage(
        &mut self,
        caller: &Address,
        previous: Address,
    ) -> Result<(), BallotError> {
        if *caller != self.owner {
            return Err(BallotError::NotOwner(*caller));
        }
        if previous.is_zero() || previous == self.address {
            return Err(BallotError::InvalidPrevious(previous));
        }
        if let Some(existing) = self.previous {
            return Err(BallotError::PreviousAlreadySet(existing));
        }
        self.previous = Some(previous);
        tracing::info!(storage = %self.address, %previous, "previous ballot storage linked");
        Ok(())
    }

    // ── Creation ────────────────────────────────────────────────────────

    pub fn create_ballot_for_member(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        header: BallotHeader,
        proposal: MemberProposal,
    ) -> Result<(), BallotError> {
        self.check_creatable(registry, caller, header.id)?;
        if !header.ballot_type.is_member_type() {
            return Err(BallotError::WrongType(header.ballot_type));
        }
        let payload = proposal.into_payload(header.ballot_type)?;
        self.insert(header, payload);
        Ok(())
    }

    /// Create a ChangeGov ballot targeting `new_logic`.
    pub fn create_ballot_for_address(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        header: BallotHeader,
        new_logic: Address,
    ) -> Result<(), BallotError> {
        self.check_creatable(registry, caller, header.id)?;
        if header.ballot_type != BallotType::ChangeGov {
            return Err(BallotError::WrongType(header.ballot_type));
        }
        if new_logic.is_zero() {
            return Err(BallotError::InvalidPayload {
                ballot_type: BallotType::ChangeGov,
                reason: "new logic must be set",
            });
        }
        self.insert(header, BallotPayload::ChangeGov { new_logic });
        Ok(())
    }

    /// Create a ChangeEnv ballot writing `name`.
    pub fn create_ballot_for_variable(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        header: BallotHeader,
        name: String,
        var_type: VarType,
        value: Vec<u8>,
    ) -> Result<(), BallotError> {
        self.check_creatable(registry, caller, header.id)?;
        if header.ballot_type != BallotType::ChangeEnv {
            return Err(BallotError::WrongType(header.ballot_type));
        }
        if !var_type.is_valid() {
            return Err(BallotError::InvalidPayload {
                ballot_type: BallotType::ChangeEnv,
                reason: "variable type must not be Invalid",
            });
        }
        self.insert(
            header,
            BallotPayload::ChangeEnv {
                name,
                var_type,
                value,
            },
        );
        Ok(())
    }

    fn check_creatable(
        &self,
        registry: &dyn Registry,
        caller: &Address,
        id: BallotId,
    ) -> Result<(), BallotError> {
        if self.is_disabled(registry) {
            return Err(BallotError::Disabled);
        }
        ensure_governance(registry, caller)?;
        if self.ballots.contains_key(&id) {
            return Err(BallotError::BallotExists(id));
        }
        Ok(())
    }

    fn insert(&mut self, header: BallotHeader, payload: BallotPayload) {
        let ballot = Ballot::new(header, payload);
        tracing::info!(
            id = ballot.id,
            ballot_type = ?ballot.ballot_type(),
            creator = %ballot.creator,
            "ballot created"
        );
        self.record(Undo::Created(ballot.id));
        self.ballots.insert(ballot.id, ballot);
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    /// Mutable access that keeps the pre-image for rollback.
    fn ballot_mut(&mut self, id: BallotId) -> Result<&mut Ballot, BallotError> {
        let ballot = self
            .ballots
            .get_mut(&id)
            .ok_or(BallotError::BallotNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::Changed(ballot.clone()));
        }
        Ok(ballot)
    }

    // ── Checkpoints ─────────────────────────────────────────────────────

    /// Start journaling mutations so they can be undone with
    /// [`rollback`](Self::rollback). Replaces any open checkpoint.
    pub fn checkpoint(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep everything done since the checkpoint.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo everything done since the checkpoint, newest first.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let undone = journal.len();
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Created(id) => {
                    self.ballots.remove(&id);
                }
                Undo::Changed(ballot) => {
                    self.ballots.insert(ballot.id, ballot);
                }
                Undo::Voted {
                    vote_id,
                    ballot_id,
                    voter,
                } => {
                    self.votes.remove(&vote_id);
                    self.voted.remove(&(ballot_id, voter));
                }
            }
        }
        tracing::debug!(undone, "ballot storage rolled back");
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Open a `Ready` ballot for voting over `[start, end]`.
    pub fn start_ballot(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        id: BallotId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<(), BallotError> {
        ensure_governance(registry, caller)?;
        let ballot = self.ballot_mut(id)?;
        if ballot.state != BallotState::Ready {
            return Err(BallotError::InvalidTransition {
                id,
                from: ballot.state,
                to: BallotState::InProgress,
            });
        }
        if end < start {
            return Err(BallotError::InvalidPeriod {
                start: start.as_secs(),
                end: end.as_secs(),
            });
        }
        ballot.start_time = Some(start);
        ballot.end_time = Some(end);
        ballot.state = BallotState::InProgress;
        tracing::info!(id, %start, %end, "ballot started");
        Ok(())
    }

    /// Record a vote and add its power to the tally.
    pub fn create_vote(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        vote_id: VoteId,
        ballot_id: BallotId,
        voter: Address,
        decision: Decision,
        power: u128,
    ) -> Result<(), BallotError> {
        ensure_governance(registry, caller)?;
        let state = self
            .ballots
            .get(&ballot_id)
            .map(|b| b.state)
            .ok_or(BallotError::BallotNotFound(ballot_id))?;
        if self.votes.contains_key(&vote_id) {
            return Err(BallotError::VoteExists(vote_id));
        }
        if self.voted.contains_key(&(ballot_id, voter)) {
            return Err(BallotError::AlreadyVoted {
                ballot: ballot_id,
                voter,
            });
        }
        if state != BallotState::InProgress {
            return Err(BallotError::InvalidTransition {
                id: ballot_id,
                from: state,
                to: BallotState::InProgress,
            });
        }

        let ballot = self.ballot_mut(ballot_id)?;
        ballot.total_voters += 1;
        match decision {
            Decision::Accept => ballot.power_of_accepts = ballot.power_of_accepts.saturating_add(power),
            Decision::Reject => ballot.power_of_rejects = ballot.power_of_rejects.saturating_add(power),
        }
        let (accepts, rejects) = (ballot.power_of_accepts, ballot.power_of_rejects);
        self.votes.insert(
            vote_id,
            Vote {
                id: vote_id,
                ballot_id,
                voter,
                decision,
                power,
            },
        );
        self.voted.insert((ballot_id, voter), vote_id);
        self.record(Undo::Voted {
            vote_id,
            ballot_id,
            voter,
        });
        tracing::debug!(
            vote_id,
            ballot_id,
            %voter,
            ?decision,
            power,
            accepts,
            rejects,
            "vote recorded"
        );
        Ok(())
    }

    /// Move an `InProgress` ballot to its terminal state.
    pub fn finalize_ballot(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        id: BallotId,
        state: BallotState,
    ) -> Result<(), BallotError> {
        ensure_governance(registry, caller)?;
        if !state.is_terminal() {
            return Err(BallotError::NotTerminal(state));
        }
        let ballot = self.ballot_mut(id)?;
        if ballot.finalized || ballot.state != BallotState::InProgress {
            return Err(BallotError::InvalidTransition {
                id,
                from: ballot.state,
                to: state,
            });
        }
        ballot.state = state;
        ballot.finalized = true;
        tracing::info!(id, ?state, voters = ballot.total_voters, "ballot finalized");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_ballot(&self, id: BallotId) -> Option<&Ballot> {
        self.ballots.get(&id)
    }

    /// `Invalid` when the ballot does not exist.
    pub fn ballot_state(&self, id: BallotId) -> BallotState {
        self.ballots
            .get(&id)
            .map(|b| b.state)
            .unwrap_or(BallotState::Invalid)
    }

    pub fn member_detail(&self, id: BallotId) -> Option<MemberBallotDetail> {
        self.ballots.get(&id).and_then(MemberBallotDetail::from_ballot)
    }

    /// Target logic of a ChangeGov ballot.
    pub fn address_detail(&self, id: BallotId) -> Option<Address> {
        match self.ballots.get(&id).map(|b| &b.payload) {
            Some(BallotPayload::ChangeGov { new_logic }) => Some(*new_logic),
            _ => None,
        }
    }

    pub fn variable_detail(&self, id: BallotId) -> Option<VariableBallotDetail> {
        match self.ballots.get(&id).map(|b| &b.payload) {
            Some(BallotPayload::ChangeEnv {
                name,
                var_type,
                value,
            }) => Some(VariableBallotDetail {
                id,
                name: name.clone(),
                var_type: *var_type,
                value: value.clone(),
            }),
            _ => None,
        }
    }

    pub fn ballot_period(&self, id: BallotId) -> Option<BallotPeriod> {
        self.ballots.get(&id).map(Ballot::period)
    }

    pub fn get_vote(&self, id: VoteId) -> Option<&Vote> {
        self.votes.get(&id)
    }

    pub fn has_already_voted(&self, ballot_id: BallotId, voter: &Address) -> bool {
        self.voted.contains_key(&(ballot_id, *voter))
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn ballots(&self) -> impl Iterator<Item = &Ballot> {
        self.ballots.values()
    }

    /// Votes recorded against `ballot_id`, in vote-id order.
    pub fn votes_for(&self, ballot_id: BallotId) -> impl Iterator<Item = &Vote> {
        self.votes.values().filter(move |v| v.ballot_id == ballot_id)
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn save_state(&self) -> Result<Vec<u8>, BallotError> {
        bincode::serialize(self).map_err(|e| BallotError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, BallotError> {
        let mut storage: Self =
            bincode::deserialize(data).map_err(|e| BallotError::Snapshot(e.to_string()))?;
        for vote in storage.votes.values() {
            if !storage.ballots.contains_key(&vote.ballot_id) {
                return Err(BallotError::Snapshot(format!(
                    "vote {} references unknown ballot {}",
                    vote.id, vote.ballot_id
                )));
            }
            storage.voted.insert((vote.ballot_id, vote.voter), vote.id);
        }
        Ok(storage)
    }
}

fn ensure_governance(registry: &dyn Registry, caller: &Address) -> Result<(), BallotError> {
    if !is_governance(registry, caller) {
        return Err(BallotError::Unauthorized(*caller));
    }
    Ok(())
}

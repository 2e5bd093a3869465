//! Core governance engine: members, proposals, voting and side effects.

use crate::error::GovernanceError;
use crate::logic::{LogicCatalog, Tally};
use crate::member::MemberSet;
use crate::proposal::{
    AddMemberProposal, ChangeEnvProposal, ChangeMemberProposal, RemoveMemberProposal, VoteReceipt,
};
use serde::{Deserialize, Serialize};
use stakegov_ballot::{
    BallotHeader, BallotId, BallotPayload, BallotState, BallotStorage, BallotType, Decision,
    MemberProposal,
};
use stakegov_env::{EnvError, EnvVariable, EnvironmentStore};
use stakegov_registry::Registry;
use stakegov_staking::{StakingError, StakingLedger};
use stakegov_types::{Address, Node, Timestamp};
use stakegov_utils::format_duration;

/// The components an engine operation reads and writes.
///
/// The engine holds none of them itself; it calls into each under its own
/// identity, which the registry must designate as the governance engine.
pub struct GovContext<'a> {
    pub registry: &'a dyn Registry,
    pub staking: &'a mut StakingLedger,
    pub ballots: &'a mut BallotStorage,
    pub env: &'a mut dyn EnvironmentStore,
    pub logics: &'a LogicCatalog,
}

/// Governance state: membership, counters, the voting slot and the bound logic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceEngine {
    address: Address,
    owner: Address,
    initialized: bool,
    logic: Address,
    members: MemberSet,
    ballot_length: u64,
    vote_length: u64,
    /// The single ballot currently accepting votes.
    voting_ballot: Option<BallotId>,
    voting_duration_secs: u64,
    weight_scale: u128,
}

impl GovernanceEngine {
    pub fn new(address: Address, owner: Address, voting_duration_secs: u64, weight_scale: u128) -> Self {
        Self {
            address,
            owner,
            initialized: false,
            logic: Address::ZERO,
            members: MemberSet::new(),
            ballot_length: 0,
            vote_length: 0,
            voting_ballot: None,
            voting_duration_secs,
            weight_scale,
        }
    }

    /// One-time bootstrap: the owner becomes member 1 and locks `required_stake`.
    pub fn init(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        logic: Address,
        required_stake: u128,
        node: Node,
    ) -> Result<(), GovernanceError> {
        if *caller != self.owner {
            return Err(GovernanceError::NotOwner(*caller));
        }
        if self.initialized {
            return Err(GovernanceError::AlreadyInitialized);
        }
        if logic.is_zero() || !ctx.logics.contains(&logic) {
            return Err(GovernanceError::InvalidLogic(logic));
        }
        if !node.is_complete() {
            return Err(GovernanceError::IncompleteNode);
        }
        if required_stake == 0 {
            return Err(GovernanceError::ZeroStake);
        }
        ctx.staking
            .lock(ctx.registry, &self.address, caller, required_stake)?;
        self.members
            .push(*caller, node)
            .ok_or(GovernanceError::AlreadyMember(*caller))?;
        self.logic = logic;
        self.initialized = true;
        tracing::info!(owner = %caller, %logic, required_stake, "governance initialized");
        Ok(())
    }

    // ── Proposals ───────────────────────────────────────────────────────

    pub fn propose_add_member(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        proposal: AddMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.ensure_member(caller)?;
        if proposal.candidate == *caller {
            return Err(GovernanceError::SelfNomination);
        }
        if self.members.contains(&proposal.candidate) {
            return Err(GovernanceError::AlreadyMember(proposal.candidate));
        }
        if proposal.stake_amount == 0 {
            return Err(GovernanceError::ZeroStake);
        }
        let header = self.next_header(BallotType::AddMember, caller, proposal.memo);
        let input = MemberProposal::add(proposal.candidate, proposal.node, proposal.stake_amount);
        self.create_member_ballot(ctx, header, input)
    }

    pub fn propose_remove_member(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        proposal: RemoveMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.ensure_member(caller)?;
        let target = proposal.target;
        if !self.members.contains(&target) {
            return Err(GovernanceError::MemberNotFound(target));
        }
        if self.members.len() == 1 {
            return Err(GovernanceError::SoleMember(target));
        }
        if proposal.stake_amount == 0 {
            return Err(GovernanceError::ZeroStake);
        }
        let locked = ctx.staking.locked_balance_of(&target);
        if proposal.stake_amount > locked {
            return Err(GovernanceError::StakeExceedsLocked {
                needed: proposal.stake_amount,
                locked,
            });
        }
        let header = self.next_header(BallotType::RemoveMember, caller, proposal.memo);
        let input = MemberProposal::remove(target, proposal.stake_amount);
        self.create_member_ballot(ctx, header, input)
    }

    pub fn propose_change_member(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        proposal: ChangeMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.ensure_member(caller)?;
        let (old, new) = (proposal.old_member, proposal.new_member);
        if !self.members.contains(&old) {
            return Err(GovernanceError::MemberNotFound(old));
        }
        if old != new && self.members.contains(&new) {
            return Err(GovernanceError::AlreadyMember(new));
        }
        if proposal.stake_amount == 0 {
            return Err(GovernanceError::ZeroStake);
        }
        if old != new {
            let locked = ctx.staking.locked_balance_of(&old);
            if proposal.stake_amount > locked {
                return Err(GovernanceError::StakeExceedsLocked {
                    needed: proposal.stake_amount,
                    locked,
                });
            }
        }
        let header = self.next_header(BallotType::ChangeMember, caller, proposal.memo);
        let input = MemberProposal::change(old, new, proposal.node, proposal.stake_amount);
        self.create_member_ballot(ctx, header, input)
    }

    /// Propose rebinding the engine to another registered logic.
    pub fn propose_change_gov(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        new_logic: Address,
        memo: String,
    ) -> Result<BallotId, GovernanceError> {
        self.ensure_member(caller)?;
        if new_logic.is_zero() || new_logic == self.logic || !ctx.logics.contains(&new_logic) {
            return Err(GovernanceError::InvalidLogic(new_logic));
        }
        let header = self.next_header(BallotType::ChangeGov, caller, memo);
        let id = header.id;
        ctx.ballots
            .create_ballot_for_address(ctx.registry, &self.address, header, new_logic)?;
        self.ballot_length = id;
        tracing::info!(ballot_id = id, proposer = %caller, %new_logic, "logic change proposed");
        Ok(id)
    }

    pub fn propose_change_env(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        proposal: ChangeEnvProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.ensure_member(caller)?;
        if proposal.name.is_empty() {
            return Err(EnvError::EmptyName.into());
        }
        EnvVariable::new(proposal.var_type, proposal.value.clone())?;
        let header = self.next_header(BallotType::ChangeEnv, caller, proposal.memo);
        let id = header.id;
        ctx.ballots.create_ballot_for_variable(
            ctx.registry,
            &self.address,
            header,
            proposal.name.clone(),
            proposal.var_type,
            proposal.value,
        )?;
        self.ballot_length = id;
        tracing::info!(ballot_id = id, proposer = %caller, name = %proposal.name, "environment change proposed");
        Ok(id)
    }

    fn next_header(&self, ballot_type: BallotType, creator: &Address, memo: String) -> BallotHeader {
        BallotHeader {
            id: self.ballot_length + 1,
            ballot_type,
            creator: *creator,
            memo,
            duration: self.voting_duration_secs,
        }
    }

    fn create_member_ballot(
        &mut self,
        ctx: &mut GovContext<'_>,
        header: BallotHeader,
        input: MemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        let id = header.id;
        let ballot_type = header.ballot_type;
        let proposer = header.creator;
        ctx.ballots
            .create_ballot_for_member(ctx.registry, &self.address, header, input)?;
        self.ballot_length = id;
        tracing::info!(ballot_id = id, ?ballot_type, %proposer, "membership change proposed");
        Ok(id)
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Cast `caller`'s current weight on `ballot_id`.
    ///
    /// The first vote on a `Ready` ballot opens it and claims the voting
    /// slot. Weight is measured against the current members' collateral only.
    /// After every vote the bound logic decides whether the ballot is
    /// resolved (a sole member's vote always does); if so it is finalized
    /// and, when accepted, applied.
    pub fn vote(
        &mut self,
        ctx: &mut GovContext<'_>,
        caller: &Address,
        ballot_id: BallotId,
        approve: bool,
        now: Timestamp,
    ) -> Result<VoteReceipt, GovernanceError> {
        self.ensure_member(caller)?;
        let ballot = ctx
            .ballots
            .get_ballot(ballot_id)
            .ok_or(GovernanceError::BallotNotFound(ballot_id))?;
        if ballot.finalized {
            return Err(GovernanceError::BallotFinalized(ballot_id));
        }
        if let Some(active) = self.voting_ballot {
            if active != ballot_id {
                return Err(GovernanceError::VotingInProgress { active });
            }
        }
        if ctx.ballots.has_already_voted(ballot_id, caller) {
            return Err(GovernanceError::AlreadyVoted {
                ballot: ballot_id,
                voter: *caller,
            });
        }

        let (state, duration) = (ballot.state, ballot.duration);
        if state == BallotState::Ready {
            ctx.ballots.start_ballot(
                ctx.registry,
                &self.address,
                ballot_id,
                now,
                now.plus_secs(duration),
            )?;
            self.voting_ballot = Some(ballot_id);
            tracing::info!(ballot_id, window = %format_duration(duration), "voting opened");
        }

        let electorate = self.electorate();
        let power = ctx
            .staking
            .calc_voting_weight_among(caller, self.weight_scale, &electorate);
        let vote_id = self.vote_length + 1;
        ctx.ballots.create_vote(
            ctx.registry,
            &self.address,
            vote_id,
            ballot_id,
            *caller,
            Decision::from_approve(approve),
            power,
        )?;
        self.vote_length = vote_id;

        let tally = self.tally(&*ctx.staking, &*ctx.ballots, ballot_id)?;
        let logic = ctx
            .logics
            .get(&self.logic)
            .cloned()
            .ok_or(GovernanceError::LogicUnavailable(self.logic))?;
        tracing::debug!(
            ballot_id,
            voter = %caller,
            approve,
            power,
            accepts = tally.accepts,
            rejects = tally.rejects,
            total = tally.total,
            "vote cast"
        );

        // A lone member's vote is the whole electorate.
        let outcome = if self.members.len() == 1 {
            Some(if approve {
                BallotState::Accepted
            } else {
                BallotState::Rejected
            })
        } else {
            logic.decide(&tally)
        };
        let state = match outcome {
            Some(outcome) => self.finalize(ctx, ballot_id, outcome)?,
            None => BallotState::InProgress,
        };
        Ok(VoteReceipt {
            vote_id,
            ballot_id,
            power,
            state,
        })
    }

    fn tally(
        &self,
        staking: &StakingLedger,
        ballots: &BallotStorage,
        ballot_id: BallotId,
    ) -> Result<Tally, GovernanceError> {
        let ballot = ballots
            .get_ballot(ballot_id)
            .ok_or(GovernanceError::BallotNotFound(ballot_id))?;
        Ok(Tally {
            accepts: ballot.power_of_accepts,
            rejects: ballot.power_of_rejects,
            total: self.total_member_weight(staking),
        })
    }

    /// Sum of every member's weight at the configured scale. Collateral
    /// left locked by former members is not part of the electorate.
    pub fn total_member_weight(&self, staking: &StakingLedger) -> u128 {
        let electorate = self.electorate();
        electorate
            .iter()
            .map(|m| staking.calc_voting_weight_among(m, self.weight_scale, &electorate))
            .sum()
    }

    fn electorate(&self) -> Vec<Address> {
        self.members.members().copied().collect()
    }

    fn finalize(
        &mut self,
        ctx: &mut GovContext<'_>,
        ballot_id: BallotId,
        outcome: BallotState,
    ) -> Result<BallotState, GovernanceError> {
        let payload = ctx
            .ballots
            .get_ballot(ballot_id)
            .ok_or(GovernanceError::BallotNotFound(ballot_id))?
            .payload
            .clone();

        let mut outcome = outcome;
        if outcome == BallotState::Accepted {
            if let Err(reason) = self.check_side_effect(ctx, &payload) {
                tracing::warn!(ballot_id, %reason, "accepted ballot can no longer be applied; rejecting");
                outcome = BallotState::Rejected;
            }
        }

        ctx.ballots
            .finalize_ballot(ctx.registry, &self.address, ballot_id, outcome)?;
        self.voting_ballot = None;
        if outcome == BallotState::Accepted {
            self.apply_side_effect(ctx, payload)?;
        }
        tracing::info!(ballot_id, ?outcome, "ballot resolved");
        Ok(outcome)
    }

    /// Whether `payload` can still be applied against the current state.
    fn check_side_effect(
        &self,
        ctx: &GovContext<'_>,
        payload: &BallotPayload,
    ) -> Result<(), GovernanceError> {
        match payload {
            BallotPayload::AddMember {
                member,
                stake_amount,
                ..
            } => {
                if self.members.contains(member) {
                    return Err(GovernanceError::AlreadyMember(*member));
                }
                ensure_available(&*ctx.staking, member, *stake_amount)
            }
            BallotPayload::RemoveMember {
                member,
                stake_amount,
            } => {
                if !self.members.contains(member) {
                    return Err(GovernanceError::MemberNotFound(*member));
                }
                if self.members.len() == 1 {
                    return Err(GovernanceError::SoleMember(*member));
                }
                ensure_locked(&*ctx.staking, member, *stake_amount)
            }
            BallotPayload::ChangeMember {
                old_member,
                new_member,
                stake_amount,
                ..
            } => {
                if !self.members.contains(old_member) {
                    return Err(GovernanceError::MemberNotFound(*old_member));
                }
                if old_member == new_member {
                    return Ok(());
                }
                if self.members.contains(new_member) {
                    return Err(GovernanceError::AlreadyMember(*new_member));
                }
                ensure_locked(&*ctx.staking, old_member, *stake_amount)?;
                ensure_available(&*ctx.staking, new_member, *stake_amount)
            }
            BallotPayload::ChangeGov { new_logic } => {
                if !ctx.logics.contains(new_logic) {
                    return Err(GovernanceError::LogicUnavailable(*new_logic));
                }
                Ok(())
            }
            BallotPayload::ChangeEnv {
                name,
                var_type,
                value,
            } => {
                if name.is_empty() {
                    return Err(EnvError::EmptyName.into());
                }
                EnvVariable::new(*var_type, value.clone())?;
                Ok(())
            }
        }
    }

    fn apply_side_effect(
        &mut self,
        ctx: &mut GovContext<'_>,
        payload: BallotPayload,
    ) -> Result<(), GovernanceError> {
        match payload {
            BallotPayload::AddMember {
                member,
                node,
                stake_amount,
            } => {
                ctx.staking
                    .lock(ctx.registry, &self.address, &member, stake_amount)?;
                let index = self
                    .members
                    .push(member, node)
                    .ok_or(GovernanceError::AlreadyMember(member))?;
                tracing::info!(%member, index, stake_amount, "member added");
            }
            BallotPayload::RemoveMember {
                member,
                stake_amount,
            } => {
                ctx.staking
                    .unlock(ctx.registry, &self.address, &member, stake_amount)?;
                self.members
                    .remove(&member)
                    .ok_or(GovernanceError::MemberNotFound(member))?;
                tracing::info!(%member, stake_amount, remaining = self.members.len(), "member removed");
            }
            BallotPayload::ChangeMember {
                old_member,
                new_member,
                node,
                stake_amount,
            } => {
                if old_member == new_member {
                    self.members.update_node(&old_member, node);
                    tracing::info!(member = %old_member, "member node updated");
                } else {
                    ctx.staking
                        .unlock(ctx.registry, &self.address, &old_member, stake_amount)?;
                    ctx.staking
                        .lock(ctx.registry, &self.address, &new_member, stake_amount)?;
                    if !self.members.replace(&old_member, new_member, node) {
                        return Err(GovernanceError::AlreadyMember(new_member));
                    }
                    tracing::info!(old = %old_member, new = %new_member, stake_amount, "member replaced");
                }
            }
            BallotPayload::ChangeGov { new_logic } => {
                let previous = std::mem::replace(&mut self.logic, new_logic);
                tracing::info!(%previous, %new_logic, "governance logic changed");
            }
            BallotPayload::ChangeEnv {
                name,
                var_type,
                value,
            } => {
                let change =
                    ctx.env
                        .set_variable(ctx.registry, &self.address, &name, var_type, value)?;
                tracing::info!(%name, ?var_type, ?change, "environment variable applied");
            }
        }
        Ok(())
    }

    fn ensure_member(&self, caller: &Address) -> Result<(), GovernanceError> {
        if !self.members.contains(caller) {
            return Err(GovernanceError::NotMember(*caller));
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Identity of the bound logic; null before init.
    pub fn logic(&self) -> Address {
        self.logic
    }

    pub fn members(&self) -> &MemberSet {
        &self.members
    }

    pub fn member_length(&self) -> usize {
        self.members.len()
    }

    pub fn get_member(&self, index: usize) -> Option<Address> {
        self.members.member_at(index)
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.members.node_at(index)
    }

    /// 1-based index, 0 for non-members.
    pub fn get_member_index(&self, member: &Address) -> usize {
        self.members.index_of(member)
    }

    pub fn is_member(&self, member: &Address) -> bool {
        self.members.contains(member)
    }

    pub fn ballot_length(&self) -> u64 {
        self.ballot_length
    }

    pub fn vote_length(&self) -> u64 {
        self.vote_length
    }

    pub fn voting_ballot(&self) -> Option<BallotId> {
        self.voting_ballot
    }

    pub fn voting_duration_secs(&self) -> u64 {
        self.voting_duration_secs
    }

    pub fn weight_scale(&self) -> u128 {
        self.weight_scale
    }

    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }
}

fn ensure_available(
    staking: &StakingLedger,
    participant: &Address,
    amount: u128,
) -> Result<(), GovernanceError> {
    let available = staking.available_balance_of(participant);
    if amount > available {
        return Err(StakingError::InsufficientBalance {
            needed: amount,
            available,
        }
        .into());
    }
    Ok(())
}

fn ensure_locked(
    staking: &StakingLedger,
    participant: &Address,
    amount: u128,
) -> Result<(), GovernanceError> {
    let locked = staking.locked_balance_of(participant);
    if amount > locked {
        return Err(GovernanceError::StakeExceedsLocked {
            needed: amount,
            locked,
        });
    }
    Ok(())
}

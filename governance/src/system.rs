//! Single-writer governance system.
//!
//! Owns every component and runs each public mutation against a staged copy
//! of the state, committing only when the whole operation succeeds. Callers
//! never observe a half-applied proposal.

use crate::config::GovernanceConfig;
use crate::engine::{GovContext, GovernanceEngine};
use crate::error::GovernanceError;
use crate::logic::{GovernanceLogic, LogicCatalog};
use crate::proposal::{
    AddMemberProposal, ChangeEnvProposal, ChangeMemberProposal, RemoveMemberProposal, VoteReceipt,
};
use stakegov_ballot::{
    Ballot, BallotId, BallotPeriod, BallotState, BallotStorage, MemberBallotDetail,
    VariableBallotDetail, Vote, VoteId,
};
use stakegov_env::{EnvStorage, EnvironmentStore, EnvVariable};
use stakegov_registry::ContractRegistry;
use stakegov_staking::StakingLedger;
use stakegov_store::{keys, StateStore};
use stakegov_types::{domain, Address, Node, Timestamp};
use std::sync::Arc;

#[derive(Debug)]
struct SystemState {
    staking: StakingLedger,
    ballots: BallotStorage,
    /// Superseded ballot storages, oldest first. Read-only.
    retired_ballots: Vec<BallotStorage>,
    env: EnvStorage,
    engine: GovernanceEngine,
}

#[derive(Debug)]
pub struct GovernanceSystem {
    registry: ContractRegistry,
    logics: LogicCatalog,
    state: SystemState,
    config: GovernanceConfig,
}

impl GovernanceSystem {
    /// Deploy fresh components and publish them in a new registry owned by `owner`.
    pub fn new(owner: Address, config: GovernanceConfig) -> Result<Self, GovernanceError> {
        config.validate()?;
        let c = &config.contracts;
        let mut registry = ContractRegistry::new(owner);
        registry.set_contract_domain(&owner, domain::STAKING, c.staking)?;
        registry.set_contract_domain(&owner, domain::BALLOT_STORAGE, c.ballot_storage)?;
        registry.set_contract_domain(&owner, domain::ENV_STORAGE, c.env_storage)?;
        registry.set_contract_domain(&owner, domain::GOVERNANCE, c.governance)?;

        let state = SystemState {
            staking: StakingLedger::new(),
            ballots: BallotStorage::new(c.ballot_storage, owner),
            retired_ballots: Vec::new(),
            env: EnvStorage::new(c.env_storage),
            engine: GovernanceEngine::new(
                c.governance,
                owner,
                config.voting_duration_secs,
                u128::from(config.weight_scale),
            ),
        };
        tracing::info!(%owner, governance = %c.governance, "governance system deployed");
        Ok(Self {
            registry,
            logics: LogicCatalog::new(),
            state,
            config,
        })
    }

    /// Run `op` all-or-nothing. The ledger, environment and engine are staged
    /// as copies; the ballot storage journals its changes in place, so the
    /// cost does not grow with ballot history. Retired storages are never
    /// touched.
    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut GovernanceEngine, &mut GovContext<'_>) -> Result<T, GovernanceError>,
    ) -> Result<T, GovernanceError> {
        let mut staking = self.state.staking.clone();
        let mut env = self.state.env.clone();
        let mut engine = self.state.engine.clone();
        self.state.ballots.checkpoint();
        let result = {
            let mut ctx = GovContext {
                registry: &self.registry,
                staking: &mut staking,
                ballots: &mut self.state.ballots,
                env: &mut env,
                logics: &self.logics,
            };
            op(&mut engine, &mut ctx)
        };
        match result {
            Ok(out) => {
                self.state.ballots.commit();
                self.state.staking = staking;
                self.state.env = env;
                self.state.engine = engine;
                Ok(out)
            }
            Err(e) => {
                self.state.ballots.rollback();
                Err(e)
            }
        }
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), GovernanceError> {
        if *caller != self.registry.owner() {
            return Err(GovernanceError::NotOwner(*caller));
        }
        Ok(())
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Make `logic` selectable under `identity`. Owner only.
    pub fn register_logic(
        &mut self,
        caller: &Address,
        identity: Address,
        logic: Arc<dyn GovernanceLogic>,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        if identity.is_zero() {
            return Err(GovernanceError::InvalidLogic(identity));
        }
        let name = logic.name().to_string();
        let replaced = self.logics.register(identity, logic).is_some();
        tracing::info!(%identity, name, replaced, "governance logic registered");
        Ok(())
    }

    pub fn set_contract_domain(
        &mut self,
        caller: &Address,
        name: &str,
        address: Address,
    ) -> Result<(), GovernanceError> {
        self.registry.set_contract_domain(caller, name, address)?;
        Ok(())
    }

    pub fn set_permission(
        &mut self,
        caller: &Address,
        name: &str,
        identity: Address,
        allowed: bool,
    ) -> Result<(), GovernanceError> {
        self.registry.set_permission(caller, name, identity, allowed)?;
        Ok(())
    }

    /// Replace the ballot storage with a fresh successor at `new_address`.
    ///
    /// The old instance is kept read-only: its ballots stay queryable, and
    /// since the registry no longer points at it, it refuses new ballots.
    pub fn upgrade_ballot_storage(
        &mut self,
        caller: &Address,
        new_address: Address,
    ) -> Result<(), GovernanceError> {
        self.ensure_owner(caller)?;
        if let Some(active) = self.state.engine.voting_ballot() {
            return Err(GovernanceError::VotingInProgress { active });
        }
        let current = self.state.ballots.address();
        let c = &self.config.contracts;
        let taken = new_address.is_zero()
            || new_address == current
            || [c.staking, c.env_storage, c.governance].contains(&new_address)
            || self
                .state
                .retired_ballots
                .iter()
                .any(|b| b.address() == new_address);
        if taken {
            return Err(GovernanceError::InvalidStorage(new_address));
        }

        let mut successor = BallotStorage::new(new_address, self.registry.owner());
        successor.set_previous_ballot_storage(caller, current)?;
        let mut registry = self.registry.clone();
        registry.set_contract_domain(caller, domain::BALLOT_STORAGE, new_address)?;

        let retired = std::mem::replace(&mut self.state.ballots, successor);
        self.state.retired_ballots.push(retired);
        self.registry = registry;
        tracing::info!(previous = %current, current = %new_address, "ballot storage upgraded");
        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────

    // Single ledger calls; they fail before mutating.
    pub fn deposit(&mut self, caller: &Address, amount: u128) -> Result<(), GovernanceError> {
        Ok(self.state.staking.deposit(caller, amount)?)
    }

    pub fn withdraw(&mut self, caller: &Address, amount: u128) -> Result<(), GovernanceError> {
        Ok(self.state.staking.withdraw(caller, amount)?)
    }

    // ── Governance ──────────────────────────────────────────────────────

    pub fn init(
        &mut self,
        caller: &Address,
        logic: Address,
        required_stake: u128,
        node: Node,
    ) -> Result<(), GovernanceError> {
        self.transact(|engine, ctx| engine.init(ctx, caller, logic, required_stake, node))
    }

    pub fn propose_add_member(
        &mut self,
        caller: &Address,
        proposal: AddMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.transact(|engine, ctx| engine.propose_add_member(ctx, caller, proposal))
    }

    pub fn propose_remove_member(
        &mut self,
        caller: &Address,
        proposal: RemoveMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.transact(|engine, ctx| engine.propose_remove_member(ctx, caller, proposal))
    }

    pub fn propose_change_member(
        &mut self,
        caller: &Address,
        proposal: ChangeMemberProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.transact(|engine, ctx| engine.propose_change_member(ctx, caller, proposal))
    }

    pub fn propose_change_gov(
        &mut self,
        caller: &Address,
        new_logic: Address,
        memo: impl Into<String>,
    ) -> Result<BallotId, GovernanceError> {
        let memo = memo.into();
        self.transact(|engine, ctx| engine.propose_change_gov(ctx, caller, new_logic, memo))
    }

    pub fn propose_change_env(
        &mut self,
        caller: &Address,
        proposal: ChangeEnvProposal,
    ) -> Result<BallotId, GovernanceError> {
        self.transact(|engine, ctx| engine.propose_change_env(ctx, caller, proposal))
    }

    pub fn vote(
        &mut self,
        caller: &Address,
        ballot_id: BallotId,
        approve: bool,
        now: Timestamp,
    ) -> Result<VoteReceipt, GovernanceError> {
        self.transact(|engine, ctx| engine.vote(ctx, caller, ballot_id, approve, now))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn logics(&self) -> &LogicCatalog {
        &self.logics
    }

    pub fn owner(&self) -> Address {
        self.registry.owner()
    }

    pub fn staking(&self) -> &StakingLedger {
        &self.state.staking
    }

    pub fn ballot_storage(&self) -> &BallotStorage {
        &self.state.ballots
    }

    pub fn retired_ballot_storages(&self) -> &[BallotStorage] {
        &self.state.retired_ballots
    }

    pub fn env_storage(&self) -> &EnvStorage {
        &self.state.env
    }

    pub fn engine(&self) -> &GovernanceEngine {
        &self.state.engine
    }

    /// Current storage first, then retired ones newest first.
    fn storages(&self) -> impl Iterator<Item = &BallotStorage> {
        std::iter::once(&self.state.ballots).chain(self.state.retired_ballots.iter().rev())
    }

    fn storage_for(&self, ballot_id: BallotId) -> Option<&BallotStorage> {
        self.storages().find(|s| s.get_ballot(ballot_id).is_some())
    }

    pub fn get_ballot(&self, ballot_id: BallotId) -> Option<&Ballot> {
        self.storage_for(ballot_id)?.get_ballot(ballot_id)
    }

    pub fn ballot_state(&self, ballot_id: BallotId) -> BallotState {
        self.get_ballot(ballot_id)
            .map(|b| b.state)
            .unwrap_or(BallotState::Invalid)
    }

    pub fn member_ballot_detail(&self, ballot_id: BallotId) -> Option<MemberBallotDetail> {
        self.storage_for(ballot_id)?.member_detail(ballot_id)
    }

    pub fn address_ballot_detail(&self, ballot_id: BallotId) -> Option<Address> {
        self.storage_for(ballot_id)?.address_detail(ballot_id)
    }

    pub fn variable_ballot_detail(&self, ballot_id: BallotId) -> Option<VariableBallotDetail> {
        self.storage_for(ballot_id)?.variable_detail(ballot_id)
    }

    pub fn ballot_period(&self, ballot_id: BallotId) -> Option<BallotPeriod> {
        self.storage_for(ballot_id)?.ballot_period(ballot_id)
    }

    pub fn get_vote(&self, vote_id: VoteId) -> Option<&Vote> {
        self.storages().find_map(|s| s.get_vote(vote_id))
    }

    pub fn has_already_voted(&self, ballot_id: BallotId, voter: &Address) -> bool {
        self.storage_for(ballot_id)
            .map(|s| s.has_already_voted(ballot_id, voter))
            .unwrap_or(false)
    }

    pub fn member_length(&self) -> usize {
        self.state.engine.member_length()
    }

    pub fn get_member(&self, index: usize) -> Option<Address> {
        self.state.engine.get_member(index)
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.state.engine.get_node(index)
    }

    pub fn get_member_index(&self, member: &Address) -> usize {
        self.state.engine.get_member_index(member)
    }

    pub fn is_member(&self, member: &Address) -> bool {
        self.state.engine.is_member(member)
    }

    pub fn voting_ballot(&self) -> Option<BallotId> {
        self.state.engine.voting_ballot()
    }

    pub fn balance_of(&self, participant: &Address) -> u128 {
        self.state.staking.balance_of(participant)
    }

    pub fn locked_balance_of(&self, participant: &Address) -> u128 {
        self.state.staking.locked_balance_of(participant)
    }

    pub fn available_balance_of(&self, participant: &Address) -> u128 {
        self.state.staking.available_balance_of(participant)
    }

    pub fn calc_voting_weight(&self, participant: &Address, scale: u128) -> u128 {
        self.state.staking.calc_voting_weight(participant, scale)
    }

    /// Weight at the engine's configured scale.
    pub fn voting_weight(&self, participant: &Address) -> u128 {
        self.state
            .staking
            .calc_voting_weight(participant, self.state.engine.weight_scale())
    }

    pub fn get_variable(&self, name: &str) -> Option<&EnvVariable> {
        self.state.env.get_variable(name)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Write every component's snapshot to `store` in one batch.
    pub fn save_to_store(&self, store: &dyn StateStore) -> Result<(), GovernanceError> {
        let retired = self
            .state
            .retired_ballots
            .iter()
            .map(BallotStorage::save_state)
            .collect::<Result<Vec<_>, _>>()?;
        let retired =
            bincode::serialize(&retired).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;

        store.put_batch(&[
            (keys::REGISTRY, self.registry.save_state()?),
            (keys::STAKING, self.state.staking.save_state()?),
            (keys::BALLOTS, self.state.ballots.save_state()?),
            (keys::RETIRED_BALLOTS, retired),
            (keys::ENV, self.state.env.save_state()?),
            (keys::ENGINE, self.state.engine.save_state()?),
        ])?;
        tracing::info!(
            ballots = self.state.ballots.ballot_count(),
            members = self.state.engine.member_length(),
            "governance state saved"
        );
        Ok(())
    }

    /// Restore from `store`. Logic implementations are code, so the catalog
    /// is supplied again; the engine's bound logic must be in it.
    pub fn load_from_store(
        store: &dyn StateStore,
        config: GovernanceConfig,
        logics: LogicCatalog,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        let registry = ContractRegistry::load_state(&store.require_state(keys::REGISTRY)?)?;
        let staking = StakingLedger::load_state(&store.require_state(keys::STAKING)?)?;
        let ballots = BallotStorage::load_state(&store.require_state(keys::BALLOTS)?)?;
        let retired_ballots = match store.get_state(keys::RETIRED_BALLOTS)? {
            Some(bytes) => {
                let raw: Vec<Vec<u8>> = bincode::deserialize(&bytes)
                    .map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
                raw.iter()
                    .map(|b| BallotStorage::load_state(b.as_slice()))
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => Vec::new(),
        };
        let env = EnvStorage::load_state(&store.require_state(keys::ENV)?)?;
        let engine = GovernanceEngine::load_state(&store.require_state(keys::ENGINE)?)?;

        if engine.is_initialized() && !logics.contains(&engine.logic()) {
            return Err(GovernanceError::LogicUnavailable(engine.logic()));
        }
        if u128::from(config.weight_scale) != engine.weight_scale() {
            tracing::warn!(
                configured = config.weight_scale,
                persisted = %engine.weight_scale(),
                "configured weight scale differs from persisted engine; keeping persisted"
            );
        }
        tracing::info!(
            ballots = ballots.ballot_count(),
            retired = retired_ballots.len(),
            members = engine.member_length(),
            "governance state loaded"
        );
        Ok(Self {
            registry,
            logics,
            state: SystemState {
                staking,
                ballots,
                retired_ballots,
                env,
                engine,
            },
            config,
        })
    }
}

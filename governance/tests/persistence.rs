//! Snapshot persistence: save a running system, restore it, keep voting.
//!
//! Runs against both the in-memory `NullStore` and a real LMDB environment.

use stakegov_ballot::BallotState;
use stakegov_governance::{
    AddMemberProposal, ChangeEnvProposal, GovernanceConfig, GovernanceSystem, LogicCatalog,
    MajorityLogic,
};
use stakegov_nullables::{NullClock, NullStore};
use stakegov_store::{keys, StateStore};
use stakegov_store_lmdb::LmdbEnvironment;
use stakegov_types::{Address, EndpointKey, ErrorKind, Node, VarType};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SNAPSHOT_KEYS: [&str; 6] = [
    keys::REGISTRY,
    keys::STAKING,
    keys::BALLOTS,
    keys::RETIRED_BALLOTS,
    keys::ENV,
    keys::ENGINE,
];

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn owner() -> Address {
    addr(1)
}

fn majority() -> Address {
    addr(0x100)
}

fn node(seed: u8) -> Node {
    Node::new(
        EndpointKey::from_bytes(vec![seed; EndpointKey::LEN]).unwrap(),
        "127.0.0.1",
        8542 + u16::from(seed),
    )
}

fn catalog() -> LogicCatalog {
    let mut logics = LogicCatalog::new();
    logics.register(majority(), Arc::new(MajorityLogic));
    logics
}

fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 30, 64 * 1024 * 1024).unwrap();
    (dir, env)
}

/// Owner (100) and member 2 (200), plus an env ballot the owner has voted on
/// and which is still collecting votes.
fn busy_system(clock: &NullClock) -> GovernanceSystem {
    let mut sys = GovernanceSystem::new(owner(), GovernanceConfig::default()).unwrap();
    sys.register_logic(&owner(), majority(), Arc::new(MajorityLogic))
        .unwrap();
    sys.deposit(&owner(), 1_000).unwrap();
    sys.deposit(&addr(2), 1_000).unwrap();
    sys.init(&owner(), majority(), 100, node(1)).unwrap();

    let id = sys
        .propose_add_member(
            &owner(),
            AddMemberProposal {
                candidate: addr(2),
                node: node(2),
                stake_amount: 200,
                memo: "second seat".to_string(),
            },
        )
        .unwrap();
    sys.vote(&owner(), id, true, clock.now()).unwrap();

    let id = sys
        .propose_change_env(
            &owner(),
            ChangeEnvProposal {
                name: "blockPer".to_string(),
                var_type: VarType::Uint,
                value: vec![0x10],
                memo: String::new(),
            },
        )
        .unwrap();
    let receipt = sys.vote(&owner(), id, true, clock.now()).unwrap();
    assert_eq!(receipt.state, BallotState::InProgress);
    sys
}

fn assert_resumable(restored: &mut GovernanceSystem, clock: &NullClock) {
    assert_eq!(restored.member_length(), 2);
    assert_eq!(restored.get_member(2), Some(addr(2)));
    assert_eq!(restored.get_node(2), Some(&node(2)));
    assert_eq!(restored.locked_balance_of(&addr(2)), 200);
    assert_eq!(restored.voting_ballot(), Some(2));
    assert_eq!(restored.ballot_state(1), BallotState::Accepted);
    assert_eq!(restored.get_ballot(2).unwrap().memo, "");

    // Dedup index is rebuilt on load.
    let err = restored.vote(&owner(), 2, true, clock.now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyVoted);

    let receipt = restored.vote(&addr(2), 2, true, clock.now()).unwrap();
    assert_eq!(receipt.state, BallotState::Accepted);
    assert_eq!(restored.get_variable("blockPer").unwrap().as_uint(), Some(16));

    let next = restored
        .propose_change_env(
            &addr(2),
            ChangeEnvProposal {
                name: "blockPer".to_string(),
                var_type: VarType::Uint,
                value: vec![0x20],
                memo: String::new(),
            },
        )
        .unwrap();
    assert_eq!(next, 3);
}

// ---------------------------------------------------------------------------
// Null store
// ---------------------------------------------------------------------------

#[test]
fn null_store_round_trip_resumes_voting() {
    let clock = NullClock::new(500);
    let sys = busy_system(&clock);
    let store = NullStore::new();
    sys.save_to_store(&store).unwrap();
    for key in SNAPSHOT_KEYS {
        assert!(store.contains(key), "missing {}", key);
    }

    let mut restored =
        GovernanceSystem::load_from_store(&store, GovernanceConfig::default(), catalog()).unwrap();
    assert_eq!(restored.owner(), owner());
    assert_resumable(&mut restored, &clock);
}

#[test]
fn load_requires_bound_logic() {
    let clock = NullClock::new(0);
    let store = NullStore::new();
    busy_system(&clock).save_to_store(&store).unwrap();

    let err = GovernanceSystem::load_from_store(
        &store,
        GovernanceConfig::default(),
        LogicCatalog::new(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn load_from_empty_store_fails() {
    let store = NullStore::new();
    let err = GovernanceSystem::load_from_store(&store, GovernanceConfig::default(), catalog())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn failed_operations_leave_state_untouched() {
    let clock = NullClock::new(0);
    let mut sys = busy_system(&clock);
    let before = NullStore::new();
    sys.save_to_store(&before).unwrap();

    assert!(sys.withdraw(&owner(), 10_000).is_err());
    assert!(sys.vote(&owner(), 2, false, clock.now()).is_err());
    assert!(sys.vote(&addr(2), 1, true, clock.now()).is_err());
    assert!(sys.init(&owner(), majority(), 1, node(1)).is_err());
    assert!(sys
        .propose_add_member(
            &owner(),
            AddMemberProposal {
                candidate: addr(3),
                node: Node::empty(),
                stake_amount: 10,
                memo: String::new(),
            },
        )
        .is_err());

    let after = NullStore::new();
    sys.save_to_store(&after).unwrap();
    for key in SNAPSHOT_KEYS {
        assert_eq!(
            before.get_state(key).unwrap(),
            after.get_state(key).unwrap(),
            "{} changed",
            key
        );
    }
}

// ---------------------------------------------------------------------------
// LMDB
// ---------------------------------------------------------------------------

#[test]
fn lmdb_round_trip_resumes_voting() {
    let clock = NullClock::new(500);
    let (_dir, env) = temp_env();
    let store = env.state_store();
    busy_system(&clock).save_to_store(&store).unwrap();

    let mut restored =
        GovernanceSystem::load_from_store(&store, GovernanceConfig::default(), catalog()).unwrap();
    assert_resumable(&mut restored, &clock);
}

#[test]
fn lmdb_snapshot_survives_reopen_with_retired_storage() {
    let clock = NullClock::new(0);
    let dir = tempfile::tempdir().unwrap();
    {
        let env = LmdbEnvironment::open(dir.path(), 30, 64 * 1024 * 1024).unwrap();
        let mut sys = busy_system(&clock);
        sys.vote(&addr(2), 2, true, clock.now()).unwrap();
        sys.upgrade_ballot_storage(&owner(), addr(0x2000)).unwrap();
        sys.save_to_store(&env.state_store()).unwrap();
    }

    let env = LmdbEnvironment::open(dir.path(), 30, 64 * 1024 * 1024).unwrap();
    let restored =
        GovernanceSystem::load_from_store(&env.state_store(), GovernanceConfig::default(), catalog())
            .unwrap();
    assert_eq!(restored.ballot_storage().address(), addr(0x2000));
    assert_eq!(restored.retired_ballot_storages().len(), 1);
    assert_eq!(restored.ballot_state(2), BallotState::Accepted);
    assert!(restored.retired_ballot_storages()[0].is_disabled(restored.registry()));
}

use stakegov_ballot::{
    BallotHeader, BallotState, BallotStorage, BallotType, Decision, MemberProposal,
};
use stakegov_registry::ContractRegistry;
use stakegov_types::{domain, Address, EndpointKey, ErrorKind, Node, Timestamp, VarType};

// ── Fixtures ────────────────────────────────────────────────────────────

fn owner() -> Address {
    Address::from_low_u64(1)
}

fn gov() -> Address {
    Address::from_low_u64(2)
}

fn storage_addr() -> Address {
    Address::from_low_u64(3)
}

fn creator() -> Address {
    Address::from_low_u64(10)
}

fn candidate() -> Address {
    Address::from_low_u64(11)
}

fn registry() -> ContractRegistry {
    let mut reg = ContractRegistry::new(owner());
    reg.set_contract_domain(&owner(), domain::GOVERNANCE, gov())
        .unwrap();
    reg.set_contract_domain(&owner(), domain::BALLOT_STORAGE, storage_addr())
        .unwrap();
    reg
}

fn node() -> Node {
    Node::new(
        EndpointKey::from_bytes(vec![0x6f; EndpointKey::LEN]).unwrap(),
        "127.0.0.1",
        8542,
    )
}

fn header(id: u64, ballot_type: BallotType) -> BallotHeader {
    BallotHeader {
        id,
        ballot_type,
        creator: creator(),
        memo: "memo".to_string(),
        duration: 86_400,
    }
}

fn add_member_ballot(store: &mut BallotStorage, reg: &ContractRegistry, id: u64) {
    store
        .create_ballot_for_member(
            reg,
            &gov(),
            header(id, BallotType::AddMember),
            MemberProposal::add(candidate(), node(), 1_000),
        )
        .unwrap();
}

// ── Creation ────────────────────────────────────────────────────────────

#[test]
fn only_governance_creates_member_ballots() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    let err = store
        .create_ballot_for_member(
            &reg,
            &creator(),
            header(1, BallotType::AddMember),
            MemberProposal::add(candidate(), node(), 1_000),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(store.ballot_state(1), BallotState::Invalid);
}

#[test]
fn permission_flag_also_grants_governance_role() {
    let mut reg = registry();
    let delegate = Address::from_low_u64(44);
    reg.set_permission(&owner(), domain::GOVERNANCE, delegate, true)
        .unwrap();
    let mut store = BallotStorage::new(storage_addr(), owner());
    store
        .create_ballot_for_address(
            &reg,
            &delegate,
            header(1, BallotType::ChangeGov),
            Address::from_low_u64(77),
        )
        .unwrap();
    assert_eq!(store.address_detail(1), Some(Address::from_low_u64(77)));
}

#[test]
fn add_member_payload_is_validated() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());

    let mut with_old = MemberProposal::add(candidate(), node(), 1_000);
    with_old.old_member = creator();
    let mut no_key = MemberProposal::add(candidate(), node(), 1_000);
    no_key.node.endpoint_key = EndpointKey::empty();
    let mut no_host = MemberProposal::add(candidate(), node(), 1_000);
    no_host.node.host = String::new();
    let mut no_port = MemberProposal::add(candidate(), node(), 1_000);
    no_port.node.port = 0;
    let no_new = MemberProposal::add(Address::ZERO, node(), 1_000);

    for input in [with_old, no_key, no_host, no_port, no_new] {
        let err = store
            .create_ballot_for_member(&reg, &gov(), header(1, BallotType::AddMember), input)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
    assert_eq!(store.ballot_count(), 0);
}

#[test]
fn fresh_ballot_is_ready_with_empty_tally() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut store, &reg, 1);

    let ballot = store.get_ballot(1).unwrap();
    assert_eq!(ballot.ballot_type(), BallotType::AddMember);
    assert_eq!(ballot.creator, creator());
    assert_eq!(ballot.state, BallotState::Ready);
    assert!(!ballot.finalized);
    assert_eq!(ballot.total_voters, 0);
    assert_eq!(ballot.power_of_accepts, 0);
    assert_eq!(ballot.power_of_rejects, 0);

    let detail = store.member_detail(1).unwrap();
    assert_eq!(detail.old_member, Address::ZERO);
    assert_eq!(detail.new_member, candidate());
    assert_eq!(detail.node, node());
    assert_eq!(detail.stake_amount, 1_000);

    let period = store.ballot_period(1).unwrap();
    assert_eq!(period.duration, 86_400);
    assert!(period.start_time.is_none());
}

#[test]
fn duplicate_id_leaves_original_untouched() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut store, &reg, 1);

    let err = store
        .create_ballot_for_address(
            &reg,
            &gov(),
            header(1, BallotType::ChangeGov),
            Address::from_low_u64(77),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(store.get_ballot(1).unwrap().ballot_type(), BallotType::AddMember);
    assert_eq!(store.member_detail(1).unwrap().new_member, candidate());
}

#[test]
fn entry_points_only_take_their_own_types() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());

    let err = store
        .create_ballot_for_member(
            &reg,
            &gov(),
            header(1, BallotType::ChangeEnv),
            MemberProposal::add(candidate(), node(), 1),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = store
        .create_ballot_for_address(&reg, &gov(), header(1, BallotType::AddMember), candidate())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = store
        .create_ballot_for_variable(
            &reg,
            &gov(),
            header(1, BallotType::ChangeGov),
            "blockPer".into(),
            VarType::Uint,
            vec![1],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn variable_ballot_rejects_invalid_type() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    let err = store
        .create_ballot_for_variable(
            &reg,
            &gov(),
            header(1, BallotType::ChangeEnv),
            "blockPer".into(),
            VarType::Invalid,
            vec![1],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    store
        .create_ballot_for_variable(
            &reg,
            &gov(),
            header(1, BallotType::ChangeEnv),
            "blockPer".into(),
            VarType::Uint,
            vec![0x03, 0xe8],
        )
        .unwrap();
    let detail = store.variable_detail(1).unwrap();
    assert_eq!(detail.name, "blockPer");
    assert_eq!(detail.var_type, VarType::Uint);
    assert_eq!(detail.value, vec![0x03, 0xe8]);
    assert!(store.member_detail(1).is_none());
}

// ── Voting ──────────────────────────────────────────────────────────────

#[test]
fn tally_matches_recorded_votes() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut store, &reg, 1);
    store
        .start_ballot(&reg, &gov(), 1, Timestamp::new(1_000), Timestamp::new(87_400))
        .unwrap();

    let votes = [
        (1u64, 20u64, Decision::Accept, 33u128),
        (2, 21, Decision::Reject, 16),
        (3, 22, Decision::Accept, 50),
    ];
    for (vote_id, voter, decision, power) in votes {
        store
            .create_vote(
                &reg,
                &gov(),
                vote_id,
                1,
                Address::from_low_u64(voter),
                decision,
                power,
            )
            .unwrap();
    }

    let ballot = store.get_ballot(1).unwrap();
    assert_eq!(ballot.total_voters, 3);
    assert_eq!(ballot.power_of_accepts, 83);
    assert_eq!(ballot.power_of_rejects, 16);
    let summed: u128 = store.votes_for(1).map(|v| v.power).sum();
    assert_eq!(ballot.power_of_accepts + ballot.power_of_rejects, summed);

    assert!(store.has_already_voted(1, &Address::from_low_u64(21)));
    assert!(!store.has_already_voted(1, &Address::from_low_u64(23)));
    assert_eq!(store.get_vote(2).unwrap().decision, Decision::Reject);

    let period = store.ballot_period(1).unwrap();
    assert_eq!(period.start_time, Some(Timestamp::new(1_000)));
    assert_eq!(period.end_time, Some(Timestamp::new(87_400)));
}

#[test]
fn only_governance_votes_or_finalizes() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut store, &reg, 1);

    let err = store
        .start_ballot(&reg, &creator(), 1, Timestamp::new(1), Timestamp::new(2))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    store
        .start_ballot(&reg, &gov(), 1, Timestamp::new(1), Timestamp::new(2))
        .unwrap();
    let err = store
        .create_vote(&reg, &creator(), 1, 1, creator(), Decision::Accept, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = store
        .finalize_ballot(&reg, &creator(), 1, BallotState::Accepted)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn start_only_from_ready() {
    let reg = registry();
    let mut store = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut store, &reg, 1);
    store
        .start_ballot(&reg, &gov(), 1, Timestamp::new(1), Timestamp::new(2))
        .unwrap();
    let err = store
        .start_ballot(&reg, &gov(), 1, Timestamp::new(1), Timestamp::new(2))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = store
        .start_ballot(&reg, &gov(), 42, Timestamp::new(1), Timestamp::new(2))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ── Migration chain ─────────────────────────────────────────────────────

#[test]
fn superseded_storage_refuses_creation_but_stays_readable() {
    let mut reg = registry();
    let mut old = BallotStorage::new(storage_addr(), owner());
    add_member_ballot(&mut old, &reg, 1);

    let successor = Address::from_low_u64(4);
    let mut new = BallotStorage::new(successor, owner());
    new.set_previous_ballot_storage(&owner(), storage_addr())
        .unwrap();
    reg.set_contract_domain(&owner(), domain::BALLOT_STORAGE, successor)
        .unwrap();

    assert!(old.is_disabled(&reg));
    assert!(!new.is_disabled(&reg));
    let err = old
        .create_ballot_for_address(
            &reg,
            &gov(),
            header(2, BallotType::ChangeGov),
            Address::from_low_u64(77),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(old.member_detail(1).unwrap().new_member, candidate());
    assert_eq!(new.previous_ballot_storage(), Some(storage_addr()));

    add_member_ballot(&mut new, &reg, 2);
    assert_eq!(new.ballot_count(), 1);
}

#[test]
fn disabled_check_precedes_authorization() {
    let mut reg = registry();
    reg.set_contract_domain(&owner(), domain::BALLOT_STORAGE, Address::from_low_u64(4))
        .unwrap();
    let mut old = BallotStorage::new(storage_addr(), owner());
    let err = old
        .create_ballot_for_address(
            &reg,
            &creator(),
            header(1, BallotType::ChangeGov),
            Address::from_low_u64(77),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn previous_storage_rules() {
    let mut store = BallotStorage::new(storage_addr(), owner());

    let err = store
        .set_previous_ballot_storage(&creator(), Address::from_low_u64(9))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = store
        .set_previous_ballot_storage(&owner(), Address::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = store
        .set_previous_ballot_storage(&owner(), storage_addr())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    store
        .set_previous_ballot_storage(&owner(), Address::from_low_u64(9))
        .unwrap();
    let err = store
        .set_previous_ballot_storage(&owner(), Address::from_low_u64(8))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(store.previous_ballot_storage(), Some(Address::from_low_u64(9)));
}

#[test]
fn unregistered_storage_is_not_disabled() {
    let reg = ContractRegistry::new(owner());
    let store = BallotStorage::new(storage_addr(), owner());
    assert!(!store.is_disabled(&reg));
}

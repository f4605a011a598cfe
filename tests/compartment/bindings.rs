//! Binding Lifecycle Tests
//!
//! play/bind/drop/transfer semantics over the role graph:
//! - roles_of order and restoration after drop
//! - core resolution over chains
//! - cycle rejection (and acceptance with checking disabled)
//! - transfer atomicity

use crate::common::{self, Account, Overdraft, Savings};
use proptest::prelude::*;
use troupe::Error;

// ============================================================================
// Wrapping
// ============================================================================

#[test]
fn wrap_rejects_unregistered_type() {
    struct Stranger;
    let mut bank = common::bank();
    let err = bank.wrap(Stranger).unwrap_err();
    assert!(matches!(err, Error::UnknownType(_)));
}

#[test]
fn wrap_assigns_registered_type_key() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    assert!(bank.contains(account));
    assert_eq!(bank.type_key_of(account).unwrap(), common::ACCOUNT);
}

// ============================================================================
// play / drop
// ============================================================================

#[test]
fn play_binds_roles_in_order() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 100 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();
    let savings = bank.play(account, Savings { funds: 200 }).unwrap();

    assert_eq!(bank.roles_of(account), vec![overdraft, savings]);
    assert!(bank.is_playing::<Overdraft>(account));
    assert!(bank.is_playing::<Savings>(account));
    assert_eq!(bank.role_of::<Overdraft>(account), Some(overdraft));
}

#[test]
fn drop_role_restores_previous_roles() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 100 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();
    let before = bank.roles_of(account);

    let savings = bank.play(account, Savings { funds: 200 }).unwrap();
    bank.drop_role(account, savings).unwrap();

    assert_eq!(bank.roles_of(account), before);
    assert_eq!(bank.roles_of(account), vec![overdraft]);
    // The disconnected role slot leaves the arena.
    assert!(!bank.contains(savings));
}

#[test]
fn drop_of_absent_binding_fails() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let other = bank.wrap(Account { balance: 0 }).unwrap();
    let savings = bank.play(account, Savings { funds: 1 }).unwrap();

    let err = bank.drop_role(other, savings).unwrap_err();
    assert!(matches!(err, Error::NotBound { .. }));
    // The original binding is untouched.
    assert_eq!(bank.roles_of(account), vec![savings]);
}

// ============================================================================
// Core resolution
// ============================================================================

#[test]
fn core_of_follows_role_chain_to_player() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 0 }).unwrap();
    let nested = bank.play(overdraft, Savings { funds: 0 }).unwrap();

    assert_eq!(bank.core_of(account).unwrap(), account);
    assert_eq!(bank.core_of(overdraft).unwrap(), account);
    assert_eq!(bank.core_of(nested).unwrap(), account);
}

#[test]
fn core_of_handles_long_chains() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let mut current = account;
    for i in 0..200 {
        current = bank.play(current, Savings { funds: i }).unwrap();
    }
    assert_eq!(bank.core_of(current).unwrap(), account);
}

#[test]
fn core_of_rejects_multiple_predecessors() {
    let mut bank = common::bank();
    let first = bank.wrap(Account { balance: 0 }).unwrap();
    let second = bank.wrap(Account { balance: 0 }).unwrap();
    let shared = bank.wrap(Savings { funds: 0 }).unwrap();
    bank.bind(first, shared).unwrap();
    bank.bind(second, shared).unwrap();

    let err = bank.core_of(shared).unwrap_err();
    assert!(matches!(err, Error::AmbiguousCore { predecessors: 2, .. }));
}

#[test]
fn core_of_stale_handle_fails() {
    let mut bank = common::bank();
    let mut other = common::bank();
    let foreign = other.wrap(Account { balance: 0 }).unwrap();
    let _local = bank.wrap(Account { balance: 0 }).unwrap();

    let err = bank.core_of(foreign).unwrap_err();
    assert!(matches!(err, Error::UnknownNode(_)));
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn cycle_bind_rejected_and_graph_unmodified() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 0 }).unwrap();
    let before = bank.bindings();

    let err = bank.bind(overdraft, account).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
    assert_eq!(bank.bindings(), before);

    let err = bank.bind(account, account).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
    assert_eq!(bank.bindings(), before);
}

#[test]
fn cycle_bind_allowed_when_checking_disabled() {
    let mut bank = common::unchecked_bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 0 }).unwrap();

    bank.bind(overdraft, account).unwrap();
    // Resolution refuses to loop instead of hanging.
    let err = bank.core_of(overdraft).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
}

// ============================================================================
// Transfer
// ============================================================================

#[test]
fn transfer_moves_exactly_one_edge() {
    let mut bank = common::bank();
    let from = bank.wrap(Account { balance: 0 }).unwrap();
    let to = bank.wrap(Account { balance: 0 }).unwrap();
    let moving = bank.play(from, Savings { funds: 0 }).unwrap();
    let staying = bank.play(from, Overdraft { funds: 0 }).unwrap();
    let edges_before = bank.bindings().len();

    bank.transfer(moving, from, to).unwrap();

    assert_eq!(bank.bindings().len(), edges_before);
    assert_eq!(bank.roles_of(from), vec![staying]);
    assert_eq!(bank.roles_of(to), vec![moving]);
    assert_eq!(bank.core_of(moving).unwrap(), to);
}

#[test]
fn transfer_of_unbound_role_fails() {
    let mut bank = common::bank();
    let from = bank.wrap(Account { balance: 0 }).unwrap();
    let to = bank.wrap(Account { balance: 0 }).unwrap();
    let loose = bank.wrap(Savings { funds: 0 }).unwrap();

    let err = bank.transfer(loose, from, to).unwrap_err();
    assert!(matches!(err, Error::NotBound { .. }));
}

#[test]
fn transfer_refuses_to_close_a_cycle() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 0 }).unwrap();
    let nested = bank.play(overdraft, Savings { funds: 0 }).unwrap();

    // Rebinding overdraft under its own sub-role would loop.
    let err = bank.transfer(overdraft, account, nested).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
    assert_eq!(bank.core_of(nested).unwrap(), account);
}

#[test]
fn transfer_all_is_all_or_nothing() {
    let mut bank = common::bank();
    let from = bank.wrap(Account { balance: 0 }).unwrap();
    let to = bank.wrap(Account { balance: 0 }).unwrap();
    let first = bank.play(from, Savings { funds: 1 }).unwrap();
    let second = bank.play(from, Savings { funds: 2 }).unwrap();
    let loose = bank.wrap(Overdraft { funds: 0 }).unwrap();

    // One invalid role in the batch leaves every edge in place.
    let err = bank.transfer_all(from, to, &[first, loose]).unwrap_err();
    assert!(matches!(err, Error::NotBound { .. }));
    assert_eq!(bank.roles_of(from), vec![first, second]);

    bank.transfer_all(from, to, &[first, second]).unwrap();
    assert!(bank.roles_of(from).is_empty());
    assert_eq!(bank.roles_of(to), vec![first, second]);
}

#[test]
fn transfer_all_moves_a_repeated_role_once() {
    let mut bank = common::bank();
    let from = bank.wrap(Account { balance: 0 }).unwrap();
    let to = bank.wrap(Account { balance: 0 }).unwrap();
    let moving = bank.play(from, Savings { funds: 1 }).unwrap();
    let staying = bank.play(from, Overdraft { funds: 0 }).unwrap();

    // The duplicate entry collapses; nothing fails mid-batch.
    bank.transfer_all(from, to, &[moving, moving]).unwrap();

    assert_eq!(bank.roles_of(from), vec![staying]);
    assert_eq!(bank.roles_of(to), vec![moving]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_play_then_drop_restores_roles(funds in proptest::collection::vec(0i64..1000, 1..8)) {
        let mut bank = common::bank();
        let account = bank.wrap(Account { balance: 0 }).unwrap();
        let baseline = bank.play(account, Overdraft { funds: 0 }).unwrap();
        let before = bank.roles_of(account);

        let mut played = Vec::new();
        for f in &funds {
            played.push(bank.play(account, Savings { funds: *f }).unwrap());
        }
        for role in played.iter().rev() {
            bank.drop_role(account, *role).unwrap();
        }

        prop_assert_eq!(bank.roles_of(account), before);
        prop_assert_eq!(bank.roles_of(account), vec![baseline]);
    }
}

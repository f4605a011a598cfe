//! Method Resolution Tests

use crate::common::{self, Account, Overdraft, PremiumAccount, Savings};
use troupe::{Error, Value};

// ============================================================================
// Core members, no roles
// ============================================================================

#[test]
fn call_resolves_on_the_wrapped_value_itself() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 100 }).unwrap();

    let balance = bank.invoke(account, "deposit", &[Value::Int(50)]).unwrap();
    assert_eq!(balance, Value::Int(150));
    bank.with_value(account, |account: &Account| {
        assert_eq!(account.balance, 150);
    })
    .unwrap();
}

#[test]
fn unknown_member_names_the_resolved_core() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let savings = bank.play(account, Savings { funds: 0 }).unwrap();

    let err = bank.invoke(savings, "vanish", &[]).unwrap_err();
    match err {
        Error::NoSuchMember { member, core } => {
            assert_eq!(member, "vanish");
            assert_eq!(core, account.node());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn call_on_stale_handle_fails() {
    let mut other = common::bank();
    let foreign = other.wrap(Account { balance: 0 }).unwrap();
    let bank = common::bank();

    let err = bank.invoke(foreign, "deposit", &[Value::Int(1)]).unwrap_err();
    assert!(matches!(err, Error::UnknownNode(_)));
}

// ============================================================================
// Resolution through roles
// ============================================================================

#[test]
fn account_overdraft_savings_scenario() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();
    let _savings = bank.play(account, Savings { funds: 200 }).unwrap();

    // Both roles declare balance/0; the first-bound role wins.
    assert_eq!(bank.invoke(account, "balance", &[]).unwrap(), Value::Int(100));

    bank.drop_role(account, overdraft).unwrap();
    assert_eq!(bank.invoke(account, "balance", &[]).unwrap(), Value::Int(200));
}

#[test]
fn call_through_a_role_handle_sees_sibling_roles() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();
    let savings = bank.play(account, Savings { funds: 200 }).unwrap();

    // Candidates are built from the resolved core, so a call through any
    // role handle resolves identically.
    assert_eq!(bank.invoke(savings, "balance", &[]).unwrap(), Value::Int(100));
    assert_eq!(bank.invoke(overdraft, "balance", &[]).unwrap(), Value::Int(100));
}

#[test]
fn mismatched_arguments_fall_through_to_the_next_candidate() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let _overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();
    let _savings = bank.play(account, Savings { funds: 50 }).unwrap();

    // Both roles declare pay/1; Overdraft takes a Str, Savings an Int.
    let paid = bank.invoke(account, "pay", &[Value::Int(20)]).unwrap();
    assert_eq!(paid, Value::Int(30));
    let paid = bank.invoke(account, "pay", &[Value::from("rent")]).unwrap();
    assert_eq!(paid, Value::Str("overdraft pays rent".into()));
}

#[test]
fn integer_arguments_widen_to_float_parameters() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let _overdraft = bank.play(account, Overdraft { funds: 100 }).unwrap();

    let scaled = bank.invoke(account, "scale", &[Value::Int(3)]).unwrap();
    assert_eq!(scaled, Value::Int(300));
}

// ============================================================================
// Role-typed argument substitution
// ============================================================================

#[test]
fn handle_arguments_substitute_to_the_declared_role() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let target = bank.wrap(Account { balance: 0 }).unwrap();
    let target_savings = bank.play(target, Savings { funds: 1 }).unwrap();

    // sweep declares its parameter as the Savings role type; passing the
    // target player hands the body its Savings sub-role.
    let swept = bank
        .invoke(account, "sweep", &[Value::Handle(target.node())])
        .unwrap();
    assert_eq!(swept, Value::Handle(target_savings.node()));
}

#[test]
fn a_handle_already_of_the_declared_type_passes_through() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let loose = bank.wrap(Savings { funds: 3 }).unwrap();

    // The argument itself is a Savings node, so substitution resolves to
    // it directly instead of requiring a bound sub-role.
    let swept = bank
        .invoke(account, "sweep", &[Value::Handle(loose.node())])
        .unwrap();
    assert_eq!(swept, Value::Handle(loose.node()));
}

#[test]
fn substitution_fails_hard_when_no_sub_role_matches() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let target = bank.wrap(Account { balance: 0 }).unwrap();
    let _overdraft = bank.play(target, Overdraft { funds: 0 }).unwrap();

    let err = bank
        .invoke(account, "sweep", &[Value::Handle(target.node())])
        .unwrap_err();
    assert!(matches!(err, Error::NoRoleForType { expected } if expected == common::SAVINGS));
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn inherited_methods_run_against_the_projected_parent() {
    let mut bank = common::bank();
    let premium = bank
        .wrap(PremiumAccount {
            base: Account { balance: 10 },
            cashback: 7,
        })
        .unwrap();

    assert_eq!(bank.invoke(premium, "cashback", &[]).unwrap(), Value::Int(7));
    // deposit is declared on Account and reaches the embedded base.
    assert_eq!(
        bank.invoke(premium, "deposit", &[Value::Int(5)]).unwrap(),
        Value::Int(15)
    );
    bank.with_value(premium, |premium: &PremiumAccount| {
        assert_eq!(premium.base.balance, 15);
    })
    .unwrap();
}

// ============================================================================
// PlayerView
// ============================================================================

#[test]
fn view_exposes_dispatch_and_introspection() {
    let mut bank = common::bank();
    let account = bank.wrap(Account { balance: 0 }).unwrap();
    let _savings = bank.play(account, Savings { funds: 40 }).unwrap();

    let view = bank.view(account);
    assert_eq!(view.call("balance", &[]).unwrap(), Value::Int(40));
    assert_eq!(view.core().unwrap(), account);
    assert!(view.is_playing::<Savings>());
    assert!(!view.is_playing::<Overdraft>());
}

//! Shared fixtures for the integration suites.
//!
//! Type registration is process-global, so every fixture type registers
//! exactly once under a `fixtures::` key; suites call [`setup`] (directly
//! or through the [`bank`] helpers) before touching them.

#![allow(dead_code)]

use std::sync::Once;
use troupe::{
    registry, Compartment, CompartmentConfig, GraphBackend, ParamType, TypeDescriptor, TypeKey,
    Value,
};

pub const ACCOUNT: TypeKey = TypeKey::new("fixtures::Account");
pub const OVERDRAFT: TypeKey = TypeKey::new("fixtures::Overdraft");
pub const SAVINGS: TypeKey = TypeKey::new("fixtures::Savings");
pub const CUSTOMER: TypeKey = TypeKey::new("fixtures::Customer");
pub const BORROWER: TypeKey = TypeKey::new("fixtures::Borrower");
pub const FREELOADER: TypeKey = TypeKey::new("fixtures::Freeloader");
pub const PREMIUM: TypeKey = TypeKey::new("fixtures::PremiumAccount");

/// Core player in most scenarios.
pub struct Account {
    pub balance: i64,
}

/// Role with its own funds and a `balance` method.
pub struct Overdraft {
    pub funds: i64,
}

/// Second role declaring the same `balance` member as Overdraft.
pub struct Savings {
    pub funds: i64,
}

/// Player with a read-only field.
pub struct Customer {
    pub name: String,
}

/// Role satisfying the `owed/0` capability.
pub struct Borrower {
    pub owed: i64,
}

/// Role with no members at all.
pub struct Freeloader;

/// Child type inheriting Account's members through projection.
pub struct PremiumAccount {
    pub base: Account,
    pub cashback: i64,
}

static REGISTER: Once = Once::new();

/// Register every fixture descriptor and install the test subscriber.
pub fn setup() {
    REGISTER.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        registry().register(
            TypeDescriptor::builder::<Account>("fixtures::Account")
                .method("deposit", &[ParamType::Int], |account, args| {
                    account.balance += args[0].as_int()?;
                    Ok(Value::Int(account.balance))
                })
                .method("withdraw", &[ParamType::Int], |account, args| {
                    account.balance -= args[0].as_int()?;
                    Ok(Value::Int(account.balance))
                })
                .method("sweep", &[ParamType::Of(SAVINGS)], |_, args| {
                    Ok(args[0].clone())
                })
                .field_mut(
                    "balance",
                    |account| Value::Int(account.balance),
                    |account, value| {
                        account.balance = value.as_int()?;
                        Ok(())
                    },
                )
                .build(),
        );

        registry().register(
            TypeDescriptor::builder::<Overdraft>("fixtures::Overdraft")
                .method("balance", &[], |overdraft, _| Ok(Value::Int(overdraft.funds)))
                .method("pay", &[ParamType::Str], |_, args| {
                    Ok(Value::Str(format!("overdraft pays {}", args[0].as_str()?)))
                })
                .method("scale", &[ParamType::Float], |overdraft, args| {
                    overdraft.funds = (overdraft.funds as f64 * args[0].as_float()?) as i64;
                    Ok(Value::Int(overdraft.funds))
                })
                .field("funds", |overdraft| Value::Int(overdraft.funds))
                .build(),
        );

        registry().register(
            TypeDescriptor::builder::<Savings>("fixtures::Savings")
                .method("balance", &[], |savings, _| Ok(Value::Int(savings.funds)))
                .method("pay", &[ParamType::Int], |savings, args| {
                    savings.funds -= args[0].as_int()?;
                    Ok(Value::Int(savings.funds))
                })
                .method("accrue", &[ParamType::Int], |savings, args| {
                    savings.funds += args[0].as_int()?;
                    Ok(Value::Int(savings.funds))
                })
                .build(),
        );

        registry().register(
            TypeDescriptor::builder::<Customer>("fixtures::Customer")
                .field("name", |customer| Value::Str(customer.name.clone()))
                .build(),
        );

        registry().register(
            TypeDescriptor::builder::<Borrower>("fixtures::Borrower")
                .method("owed", &[], |borrower, _| Ok(Value::Int(borrower.owed)))
                .build(),
        );

        registry()
            .register(TypeDescriptor::builder::<Freeloader>("fixtures::Freeloader").build());

        registry().register(
            TypeDescriptor::builder::<PremiumAccount>("fixtures::PremiumAccount")
                .parent::<Account>(
                    "fixtures::Account",
                    |premium| &premium.base,
                    |premium| &mut premium.base,
                )
                .method("cashback", &[], |premium, _| Ok(Value::Int(premium.cashback)))
                .build(),
        );
    });
}

/// Fresh default compartment with fixtures registered.
pub fn bank() -> Compartment {
    setup();
    Compartment::new()
}

/// Fresh compartment over an explicit graph backend.
pub fn bank_with(backend: GraphBackend) -> Compartment {
    setup();
    Compartment::with_config(CompartmentConfig {
        cycle_check: true,
        backend,
    })
}

/// Fresh compartment with cycle checking disabled.
pub fn unchecked_bank() -> Compartment {
    setup();
    Compartment::with_config(CompartmentConfig {
        cycle_check: false,
        backend: GraphBackend::Adjacency,
    })
}

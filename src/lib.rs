//! Troupe - Role-oriented runtime composition for Rust
//!
//! Troupe lets plain values acquire and shed behavior at runtime: a
//! player wrapped into a [`Compartment`] can play roles, and member
//! access on the player resolves dynamically against the roles currently
//! bound to its core.
//!
//! # Quick Start
//!
//! ```ignore
//! use troupe::{match_all, Compartment, TypeDescriptor, Value};
//!
//! let mut bank = Compartment::new();
//!
//! // Wrap a core value, then let it play a role.
//! let account = bank.wrap(Account::new(100))?;
//! let overdraft = bank.play(account, Overdraft::with_limit(500))?;
//!
//! // Calls on the account now resolve against the bound role first.
//! bank.invoke(account, "withdraw", &[Value::Int(300)])?;
//! ```
//!
//! # Architecture
//!
//! Type registration and member tables live in the metadata layer;
//! play-relations live in a per-compartment role graph with pluggable
//! backends; the engine resolves cores, orders candidates, and invokes
//! the first matching member. The facade re-exports the whole public
//! surface; the member crates are an implementation detail.

pub use troupe_core::{
    CapabilitySet, Error, MemberSig, NodeId, ParamType, PlaysEdge, Predecessors, Result,
    RoleGraph, TypeKey, Value,
};
pub use troupe_engine::{
    match_all, playing, And, Compartment, CompartmentConfig, DispatchQuery, GraphBackend,
    MatchAll, Not, Or, Player, PlayerView, Playing, QueryStrategy, QueryStrategyExt,
    RestrictionTable, Where,
};
pub use troupe_meta::{metadata, registry, MemberSet, TypeDescriptor, TypeRegistry};

//! Role-playing engine: compartments, dispatch, queries, restrictions
//!
//! This crate ties the role graph and the metadata cache together into the
//! runtime surface: a [`Compartment`] wraps values into [`Player`] handles,
//! binds roles to them, and resolves member access dynamically against the
//! roles currently bound.
//!
//! ```
//! use troupe_core::Value;
//! use troupe_engine::{match_all, Compartment};
//! use troupe_meta::{registry, TypeDescriptor};
//!
//! struct Greeter {
//!     name: String,
//! }
//!
//! registry().register(
//!     TypeDescriptor::builder::<Greeter>("docs::Greeter")
//!         .method("greet", &[], |greeter: &mut Greeter, _| {
//!             Ok(Value::Str(format!("hello from {}", greeter.name)))
//!         })
//!         .build(),
//! );
//!
//! let mut compartment = Compartment::new();
//! let player = compartment
//!     .wrap(Greeter { name: "ada".to_string() })
//!     .unwrap();
//! let reply = compartment.invoke(player, "greet", &[]).unwrap();
//! assert_eq!(reply, Value::Str("hello from ada".to_string()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod compartment;
mod dispatch;
mod player;
mod restriction;
mod strategy;

pub use compartment::{Compartment, CompartmentConfig};
pub use dispatch::DispatchQuery;
pub use player::{Player, PlayerView};
pub use restriction::RestrictionTable;
pub use strategy::{
    match_all, playing, And, MatchAll, Not, Or, Playing, QueryStrategy, QueryStrategyExt, Where,
};

pub use troupe_graph::GraphBackend;

//! Core types and traits for Troupe
//!
//! This crate defines the foundational types used throughout the role
//! engine:
//! - NodeId: Opaque handle for players/roles in a compartment arena
//! - TypeKey: Stable identifier for registered role types
//! - PlaysEdge, MemberSig, CapabilitySet: Graph and signature types
//! - Value / ParamType: The dynamic value model and widening table
//! - Error: Error condition hierarchy
//! - RoleGraph: The graph backend contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use traits::{Predecessors, RoleGraph};
pub use types::{CapabilitySet, MemberSig, NodeId, PlaysEdge, TypeKey};
pub use value::{ParamType, Value};

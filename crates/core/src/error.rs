//! Error types for the role engine
//!
//! This module defines all error conditions surfaced by the compartment
//! API and the dispatch engine. We use `thiserror` for automatic `Display`
//! and `Error` trait implementations.
//!
//! Every condition aborts the triggering operation without partial
//! mutation; nothing here is retried internally.

use crate::types::{MemberSig, NodeId, TypeKey};
use thiserror::Error;

/// Result type alias for role-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error conditions for the role engine
#[derive(Debug, Error)]
pub enum Error {
    /// A typed `one` query found zero matching players
    #[error("no core found for type {0}")]
    CoreNotFound(TypeKey),

    /// Graph invariant violated: a node has more than one predecessor edge
    #[error("ambiguous core: node {node} has {predecessors} predecessors")]
    AmbiguousCore {
        /// The node with multiple in-edges
        node: NodeId,
        /// How many predecessors were found
        predecessors: usize,
    },

    /// No candidate in the ordered dispatch sequence exposes the member
    #[error("no member {member:?} reachable from core {core}")]
    NoSuchMember {
        /// The requested member name
        member: String,
        /// The resolved core of the dispatch
        core: NodeId,
    },

    /// A role-typed argument has no bound role of the required type
    #[error("no role of type {expected} bound to argument")]
    NoRoleForType {
        /// The declared parameter type that could not be satisfied
        expected: TypeKey,
    },

    /// A role fails a registered structural capability requirement
    #[error("role violates restriction on {player_type}: missing {missing:?}")]
    RestrictionViolation {
        /// The restricted player type
        player_type: TypeKey,
        /// The required signatures the role does not provide
        missing: Vec<MemberSig>,
    },

    /// The binding closes a cycle (rejected at bind time when cycle
    /// checking is enabled, or discovered during core resolution)
    #[error("cycle detected on play-relation {core} -> {role}")]
    CycleDetected {
        /// The intended core of the rejected edge
        core: NodeId,
        /// The intended role of the rejected edge
        role: NodeId,
    },

    /// Removal of a play-relation that does not exist
    #[error("no binding {core} -> {role}")]
    NotBound {
        /// The edge's expected core
        core: NodeId,
        /// The edge's expected role
        role: NodeId,
    },

    /// A value's type was never registered with the type registry
    #[error("type {0:?} is not registered")]
    UnknownType(String),

    /// A node handle does not resolve in this compartment
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A dynamic value had the wrong variant or failed to downcast
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected kind/type
        expected: String,
        /// The actual kind/type
        actual: String,
    },

    /// Write to a field registered without a setter
    #[error("field {field:?} is immutable")]
    ImmutableField {
        /// The field name
        field: String,
    },
}

//! Core types for the Troupe role engine
//!
//! This module defines the foundational types:
//! - NodeId: Opaque handle identifying a player/role node in the arena
//! - TypeKey: Stable identifier assigned to a role type at registration
//! - PlaysEdge: Directed play-relation (core -> role)
//! - MemberSig: Signature of a callable member (method or field)
//! - CapabilitySet: Set of member signatures required by a restriction

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle identifying a node (player or role) in a compartment arena
///
/// NodeIds are allocated from a process-wide monotonic counter, so a node
/// keeps its identity when compartments are merged or split. The id carries
/// no meaning beyond identity and allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Process-wide allocator for node ids. Never reset.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Allocate the next node id from the process-wide counter
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for diagnostics only
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier for a registered role/player type
///
/// Assigned once when a type descriptor is registered. Runtime type checks
/// ("is this node an instance of role type T") compare TypeKeys, never
/// language-level reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(&'static str);

impl TypeKey {
    /// Create a type key from its stable name
    pub const fn new(name: &'static str) -> Self {
        TypeKey(name)
    }

    /// The stable name this key was registered under
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Directed play-relation: `core` plays `role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaysEdge {
    /// The node acquiring behavior
    pub core: NodeId,
    /// The role supplying behavior
    pub role: NodeId,
}

impl PlaysEdge {
    /// Create an edge core -> role
    pub fn new(core: NodeId, role: NodeId) -> Self {
        PlaysEdge { core, role }
    }
}

impl fmt::Display for PlaysEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} plays {}", self.core, self.role)
    }
}

/// Signature of a callable member
///
/// `arity` is `Some(n)` for a method taking n arguments and `None` for a
/// field. Two members with the same name but different arity are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberSig {
    /// Member name (method or field)
    pub name: String,
    /// Argument count for methods, None for fields
    pub arity: Option<usize>,
}

impl MemberSig {
    /// Signature of a method with the given arity
    pub fn method(name: impl Into<String>, arity: usize) -> Self {
        MemberSig {
            name: name.into(),
            arity: Some(arity),
        }
    }

    /// Signature of a field
    pub fn field(name: impl Into<String>) -> Self {
        MemberSig {
            name: name.into(),
            arity: None,
        }
    }
}

impl fmt::Display for MemberSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity {
            Some(n) => write!(f, "{}/{}", self.name, n),
            None => f.write_str(&self.name),
        }
    }
}

/// Set of member signatures a restriction requires a role to provide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    sigs: Vec<MemberSig>,
}

impl CapabilitySet {
    /// Empty capability set (requires nothing)
    pub fn new() -> Self {
        CapabilitySet::default()
    }

    /// Require a method with the given name and arity
    pub fn method(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.sigs.push(MemberSig::method(name, arity));
        self
    }

    /// Require a field with the given name
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.sigs.push(MemberSig::field(name));
        self
    }

    /// Iterate the required signatures
    pub fn iter(&self) -> impl Iterator<Item = &MemberSig> {
        self.sigs.iter()
    }

    /// Number of required signatures
    pub fn len(&self) -> usize {
        self.sigs.len()
    }

    /// True if nothing is required
    pub fn is_empty(&self) -> bool {
        self.sigs.is_empty()
    }
}

impl FromIterator<MemberSig> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = MemberSig>>(iter: I) -> Self {
        CapabilitySet {
            sigs: iter.into_iter().collect(),
        }
    }
}

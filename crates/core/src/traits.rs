//! Core trait for role-graph backends
//!
//! This module defines the RoleGraph contract that all graph backends
//! implement. Backends are interchangeable behind this trait and must not
//! diverge in observable behavior, only in performance.

use crate::error::Result;
use crate::types::{NodeId, PlaysEdge};
use smallvec::SmallVec;

/// Direct predecessors of a node
///
/// Well-formed graphs have at most one; the inline capacity of two exists
/// so an inconsistent state can be reported rather than silently truncated.
pub type Predecessors = SmallVec<[NodeId; 2]>;

/// Mutable directed graph of play-relations within one compartment
///
/// Edges run core -> role. The contract is identical across backends:
/// a memoizing decorator and an alternative representation must behave
/// exactly like the default adjacency implementation.
///
/// Thread safety: implementations are `Send` so a compartment can be moved
/// or guarded by an external mutex, but no internal synchronization is
/// provided; callers serialize access.
pub trait RoleGraph: std::fmt::Debug + Send {
    /// Insert a core -> role edge, creating nodes as needed
    ///
    /// Inserting an existing edge is a no-op. When cycle checking is
    /// enabled, the edge is first verified not to close a cycle from
    /// `role` back to `core`.
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` (and performs no mutation) if the edge
    /// would close a cycle while cycle checking is enabled.
    fn add_binding(&mut self, core: NodeId, role: NodeId) -> Result<()>;

    /// Remove the core -> role edge
    ///
    /// # Errors
    ///
    /// Returns `NotBound` if the edge does not exist.
    fn remove_binding(&mut self, core: NodeId, role: NodeId) -> Result<()>;

    /// Roles directly bound to `core`, in edge insertion order
    fn roles_of(&self, core: NodeId) -> Vec<NodeId>;

    /// Direct in-edge sources of `node`
    ///
    /// At most one in a well-formed graph; more than one is an
    /// inconsistent state the caller must surface, never resolve silently.
    fn predecessors_of(&self, node: NodeId) -> Predecessors;

    /// Whether the exact core -> role edge exists
    fn contains_edge(&self, core: NodeId, role: NodeId) -> bool;

    /// Whether `node` is incident to any edge
    fn contains_node(&self, node: NodeId) -> bool;

    /// All edges currently in the graph
    fn edges(&self) -> Vec<PlaysEdge>;

    /// Union the given edges into this graph
    ///
    /// Raw union: duplicate edges are skipped and no cycle validation is
    /// performed. Compartment composition copies edges by reference.
    fn merge(&mut self, edges: &[PlaysEdge]);

    /// Remove exactly the given edges; absent edges are skipped
    fn subtract(&mut self, edges: &[PlaysEdge]);
}

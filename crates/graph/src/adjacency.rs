//! Default adjacency-based role graph
//!
//! Out-edges live in per-core vectors so `roles_of` preserves edge
//! insertion order, which the dispatch candidate sequence depends on.
//! In-edges are tracked separately so predecessor lookups stay O(1)
//! without scanning every adjacency list.
//!
//! Edge add/remove are O(1) amortized; the optional cycle check is a
//! bounded depth-first search from the candidate role toward the candidate
//! core, O(V+E) worst case.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;
use troupe_core::{Error, NodeId, PlaysEdge, Predecessors, Result, RoleGraph};

/// Adjacency-list role graph (the default backend)
#[derive(Debug, Default)]
pub struct AdjacencyGraph {
    /// core -> roles, in insertion order
    out: FxHashMap<NodeId, Vec<NodeId>>,
    /// role -> cores binding it
    inc: FxHashMap<NodeId, SmallVec<[NodeId; 2]>>,
    /// Reject edges that would close a cycle
    cycle_check: bool,
}

impl AdjacencyGraph {
    /// Create an empty graph
    pub fn new(cycle_check: bool) -> Self {
        AdjacencyGraph {
            out: FxHashMap::default(),
            inc: FxHashMap::default(),
            cycle_check,
        }
    }

    /// Whether cycle checking is enabled
    pub fn cycle_check(&self) -> bool {
        self.cycle_check
    }

    /// DFS from `role` over out-edges: does it reach `core`?
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(next) = self.out.get(&node) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }

    /// Insert the edge without any cycle validation
    fn insert_raw(&mut self, core: NodeId, role: NodeId) {
        self.out.entry(core).or_default().push(role);
        self.inc.entry(role).or_default().push(core);
    }

    /// Remove the edge; true if it existed
    fn remove_raw(&mut self, core: NodeId, role: NodeId) -> bool {
        let Some(roles) = self.out.get_mut(&core) else {
            return false;
        };
        let Some(pos) = roles.iter().position(|r| *r == role) else {
            return false;
        };
        roles.remove(pos);
        if roles.is_empty() {
            self.out.remove(&core);
        }
        if let Some(cores) = self.inc.get_mut(&role) {
            if let Some(pos) = cores.iter().position(|c| *c == core) {
                cores.remove(pos);
            }
            if cores.is_empty() {
                self.inc.remove(&role);
            }
        }
        true
    }
}

impl RoleGraph for AdjacencyGraph {
    fn add_binding(&mut self, core: NodeId, role: NodeId) -> Result<()> {
        if self.contains_edge(core, role) {
            return Ok(());
        }
        if self.cycle_check && (core == role || self.reaches(role, core)) {
            return Err(Error::CycleDetected { core, role });
        }
        self.insert_raw(core, role);
        debug!(target: "troupe::graph", %core, %role, "Binding added");
        Ok(())
    }

    fn remove_binding(&mut self, core: NodeId, role: NodeId) -> Result<()> {
        if !self.remove_raw(core, role) {
            return Err(Error::NotBound { core, role });
        }
        debug!(target: "troupe::graph", %core, %role, "Binding removed");
        Ok(())
    }

    fn roles_of(&self, core: NodeId) -> Vec<NodeId> {
        self.out.get(&core).cloned().unwrap_or_default()
    }

    fn predecessors_of(&self, node: NodeId) -> Predecessors {
        self.inc.get(&node).cloned().unwrap_or_default()
    }

    fn contains_edge(&self, core: NodeId, role: NodeId) -> bool {
        self.out
            .get(&core)
            .is_some_and(|roles| roles.contains(&role))
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.out.contains_key(&node) || self.inc.contains_key(&node)
    }

    fn edges(&self) -> Vec<PlaysEdge> {
        self.out
            .iter()
            .flat_map(|(core, roles)| roles.iter().map(|role| PlaysEdge::new(*core, *role)))
            .collect()
    }

    fn merge(&mut self, edges: &[PlaysEdge]) {
        for edge in edges {
            if !self.contains_edge(edge.core, edge.role) {
                self.insert_raw(edge.core, edge.role);
            }
        }
    }

    fn subtract(&mut self, edges: &[PlaysEdge]) {
        for edge in edges {
            self.remove_raw(edge.core, edge.role);
        }
    }
}

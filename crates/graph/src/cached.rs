//! Memoizing decorator over the default graph
//!
//! Intended for read-heavy workloads where bindings change rarely relative
//! to dispatch volume: `roles_of` results are memoized per core, and any
//! structural mutation invalidates exactly the touched cores' entries, not
//! the whole cache.

use crate::adjacency::AdjacencyGraph;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;
use troupe_core::{NodeId, PlaysEdge, Predecessors, Result, RoleGraph};

/// Caching role graph wrapping [`AdjacencyGraph`]
#[derive(Debug)]
pub struct CachedRoleGraph {
    inner: AdjacencyGraph,
    /// Memoized roles_of results; entries dropped on per-node invalidation
    memo: Mutex<FxHashMap<NodeId, Arc<[NodeId]>>>,
}

impl CachedRoleGraph {
    /// Create an empty cached graph
    pub fn new(cycle_check: bool) -> Self {
        CachedRoleGraph {
            inner: AdjacencyGraph::new(cycle_check),
            memo: Mutex::new(FxHashMap::default()),
        }
    }

    /// Drop the memoized entry for one core
    fn invalidate(&self, core: NodeId) {
        if self.memo.lock().remove(&core).is_some() {
            trace!(target: "troupe::graph", %core, "Role cache invalidated");
        }
    }

    #[cfg(test)]
    fn memoized(&self, core: NodeId) -> bool {
        self.memo.lock().contains_key(&core)
    }
}

impl RoleGraph for CachedRoleGraph {
    fn add_binding(&mut self, core: NodeId, role: NodeId) -> Result<()> {
        self.inner.add_binding(core, role)?;
        self.invalidate(core);
        Ok(())
    }

    fn remove_binding(&mut self, core: NodeId, role: NodeId) -> Result<()> {
        self.inner.remove_binding(core, role)?;
        self.invalidate(core);
        Ok(())
    }

    fn roles_of(&self, core: NodeId) -> Vec<NodeId> {
        if let Some(cached) = self.memo.lock().get(&core) {
            return cached.to_vec();
        }
        let roles = self.inner.roles_of(core);
        self.memo.lock().insert(core, Arc::from(roles.as_slice()));
        roles
    }

    fn predecessors_of(&self, node: NodeId) -> Predecessors {
        self.inner.predecessors_of(node)
    }

    fn contains_edge(&self, core: NodeId, role: NodeId) -> bool {
        self.inner.contains_edge(core, role)
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.inner.contains_node(node)
    }

    fn edges(&self) -> Vec<PlaysEdge> {
        self.inner.edges()
    }

    fn merge(&mut self, edges: &[PlaysEdge]) {
        self.inner.merge(edges);
        for edge in edges {
            self.invalidate(edge.core);
        }
    }

    fn subtract(&mut self, edges: &[PlaysEdge]) {
        self.inner.subtract(edges);
        for edge in edges {
            self.invalidate(edge.core);
        }
    }
}

//! Petgraph-backed role graph
//!
//! Alternative backend over `petgraph::stable_graph::StableDiGraph`,
//! kept behaviorally identical to [`AdjacencyGraph`]; it exists for
//! performance comparison only.
//!
//! petgraph iterates out-neighbors newest-edge-first, so results are
//! reversed to present edge insertion order like the default backend.

use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use tracing::debug;
use troupe_core::{Error, NodeId, PlaysEdge, Predecessors, Result, RoleGraph};

/// StableDiGraph-based role graph (alternative backend)
#[derive(Debug, Default)]
pub struct StableGraphBackend {
    graph: StableDiGraph<NodeId, ()>,
    index: FxHashMap<NodeId, NodeIndex>,
    cycle_check: bool,
}

impl StableGraphBackend {
    /// Create an empty graph
    pub fn new(cycle_check: bool) -> Self {
        StableGraphBackend {
            graph: StableDiGraph::default(),
            index: FxHashMap::default(),
            cycle_check,
        }
    }

    fn ensure(&mut self, node: NodeId) -> NodeIndex {
        match self.index.get(&node) {
            Some(idx) => *idx,
            None => {
                let idx = self.graph.add_node(node);
                self.index.insert(node, idx);
                idx
            }
        }
    }

    /// Drop a node that is no longer incident to any edge
    fn prune(&mut self, node: NodeId) {
        if let Some(idx) = self.index.get(&node).copied() {
            let isolated = self
                .graph
                .neighbors_undirected(idx)
                .next()
                .is_none();
            if isolated {
                self.graph.remove_node(idx);
                self.index.remove(&node);
            }
        }
    }

    fn insert_raw(&mut self, core: NodeId, role: NodeId) {
        let core_idx = self.ensure(core);
        let role_idx = self.ensure(role);
        self.graph.add_edge(core_idx, role_idx, ());
    }

    fn remove_raw(&mut self, core: NodeId, role: NodeId) -> bool {
        let (Some(core_idx), Some(role_idx)) =
            (self.index.get(&core).copied(), self.index.get(&role).copied())
        else {
            return false;
        };
        let Some(edge) = self.graph.find_edge(core_idx, role_idx) else {
            return false;
        };
        self.graph.remove_edge(edge);
        self.prune(core);
        self.prune(role);
        true
    }
}

impl RoleGraph for StableGraphBackend {
    fn add_binding(&mut self, core: NodeId, role: NodeId) -> Result<()> {
        if self.contains_edge(core, role) {
            return Ok(());
        }
        if self.cycle_check {
            if core == role {
                return Err(Error::CycleDetected { core, role });
            }
            // A path role -> core can only exist if both nodes already do.
            if let (Some(role_idx), Some(core_idx)) =
                (self.index.get(&role).copied(), self.index.get(&core).copied())
            {
                if has_path_connecting(&self.graph, role_idx, core_idx, None) {
                    return Err(Error::CycleDetected { core, role });
                }
            }
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
        let Some(idx) = self.index.get(&core).copied() else {
            return Vec::new();
        };
        let mut roles: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        roles.reverse();
        roles
    }

    fn predecessors_of(&self, node: NodeId) -> Predecessors {
        let Some(idx) = self.index.get(&node).copied() else {
            return Predecessors::new();
        };
        let mut cores: Predecessors = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        cores.reverse();
        cores
    }

    fn contains_edge(&self, core: NodeId, role: NodeId) -> bool {
        match (self.index.get(&core), self.index.get(&role)) {
            (Some(c), Some(r)) => self.graph.find_edge(*c, *r).is_some(),
            _ => false,
        }
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    fn edges(&self) -> Vec<PlaysEdge> {
        self.graph
            .edge_references()
            .map(|e| PlaysEdge::new(self.graph[e.source()], self.graph[e.target()]))
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

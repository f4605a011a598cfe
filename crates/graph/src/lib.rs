//! Role-graph backends for Troupe
//!
//! Three interchangeable implementations of the `RoleGraph` contract:
//! - [`AdjacencyGraph`]: adjacency-list default
//! - [`CachedRoleGraph`]: memoizing decorator for read-heavy workloads
//! - [`StableGraphBackend`]: petgraph-based alternative
//!
//! Backends differ only in performance; observable behavior is identical.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod cached;
pub mod stable;

pub use adjacency::AdjacencyGraph;
pub use cached::CachedRoleGraph;
pub use stable::StableGraphBackend;

use troupe_core::RoleGraph;

/// Which role-graph implementation a compartment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphBackend {
    /// Adjacency-list default
    #[default]
    Adjacency,
    /// Memoizing decorator over the default
    Cached,
    /// petgraph `StableDiGraph` alternative
    Stable,
}

impl GraphBackend {
    /// Instantiate the selected backend
    pub fn instantiate(self, cycle_check: bool) -> Box<dyn RoleGraph> {
        match self {
            GraphBackend::Adjacency => Box::new(AdjacencyGraph::new(cycle_check)),
            GraphBackend::Cached => Box::new(CachedRoleGraph::new(cycle_check)),
            GraphBackend::Stable => Box::new(StableGraphBackend::new(cycle_check)),
        }
    }
}

//! Player handles and the dispatching wrapper
//!
//! A [`Player`] is a cheap Copy handle naming a node inside a compartment.
//! Construction is always explicit (`Compartment::wrap` or the handle
//! returned by `play`); there is no silent coercion from a raw value.
//!
//! [`PlayerView`] bundles a handle with its compartment and an active
//! [`DispatchQuery`], exposing member access the way a caller would use
//! the wrapped value directly.

use crate::compartment::Compartment;
use crate::dispatch::DispatchQuery;
use troupe_core::{NodeId, Result, Value};

/// Handle to a wrapped player or role node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Player {
    node: NodeId,
}

impl Player {
    pub(crate) fn from_node(node: NodeId) -> Self {
        Player { node }
    }

    /// The underlying node id
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.node)
    }
}

/// Borrowing dispatch wrapper around a player
///
/// Obtained from [`Compartment::view`]. All member access resolves through
/// the compartment's role graph: bound roles first, then the wrapped
/// value, then the resolved core, reordered by the attached query.
#[derive(Clone)]
pub struct PlayerView<'a> {
    compartment: &'a Compartment,
    player: Player,
    query: DispatchQuery,
}

impl<'a> PlayerView<'a> {
    pub(crate) fn new(compartment: &'a Compartment, player: Player) -> Self {
        PlayerView {
            compartment,
            player,
            query: DispatchQuery::default(),
        }
    }

    /// Replace the active dispatch query
    pub fn with_query(mut self, query: DispatchQuery) -> Self {
        self.query = query;
        self
    }

    /// The wrapped handle
    pub fn player(&self) -> Player {
        self.player
    }

    /// Call a member method through dynamic dispatch
    pub fn call(&self, member: &str, args: &[Value]) -> Result<Value> {
        self.compartment
            .invoke_with(self.player, &self.query, member, args)
    }

    /// Read a field through dynamic dispatch
    pub fn get(&self, field: &str) -> Result<Value> {
        self.compartment
            .get_field_with(self.player, &self.query, field)
    }

    /// Update a field through dynamic dispatch
    pub fn set(&self, field: &str, value: Value) -> Result<()> {
        self.compartment
            .set_field_with(self.player, &self.query, field, value)
    }

    /// Resolve the ultimate core of this handle
    pub fn core(&self) -> Result<Player> {
        self.compartment.core_of(self.player)
    }

    /// Whether a role of type `T` is directly bound to this node
    pub fn is_playing<T: 'static>(&self) -> bool {
        self.compartment.is_playing::<T>(self.player)
    }
}

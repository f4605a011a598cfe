//! Compartment: bounded context owning one role graph
//!
//! ## Design
//!
//! A Compartment owns an arena of node slots (the wrapped player/role
//! values), exactly one [`RoleGraph`] instance recording play-relations,
//! and a [`RestrictionTable`] consulted on every bind. All role-playing
//! operations go through it.
//!
//! ## Thread Safety
//!
//! Single-threaded mutation model: the graph and its caches are ordinary
//! mutable state with no internal locking for correctness. Concurrent
//! mutation without external synchronization is undefined; callers
//! serialize access, e.g. with a mutex around each compartment. The
//! per-slot `RwLock` is ownership plumbing so merged compartments can
//! share node values, not a concurrency guarantee.
//!
//! ## API
//!
//! - **Bind/unbind**: `play`, `bind`, `drop_role`, `transfer`,
//!   `transfer_all`; all-or-nothing, validated before any mutation.
//! - **Composition**: `part_of` (one-directional edge union), `union`
//!   (bidirectional), `not_part_of` (edge subtraction).
//! - **Queries**: `all`, `one`, `is_playing`, `role_of`.
//! - **Dispatch**: `invoke`, `get_field`, `set_field`, `view`.

use crate::dispatch::{self, DispatchQuery};
use crate::player::{Player, PlayerView};
use crate::restriction::RestrictionTable;
use crate::strategy::QueryStrategy;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use troupe_core::{CapabilitySet, Error, NodeId, PlaysEdge, Result, RoleGraph, TypeKey, Value};
use troupe_graph::GraphBackend;
use troupe_meta::registry;

/// Shared, lockable storage for one wrapped value
pub(crate) type SlotValue = Arc<RwLock<Box<dyn Any + Send + Sync>>>;

/// One wrapped player/role value in the arena
pub(crate) struct NodeSlot {
    pub(crate) value: SlotValue,
    pub(crate) key: TypeKey,
    pub(crate) rust_type: TypeId,
}

impl fmt::Debug for NodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSlot").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Construction-time configuration for a compartment
#[derive(Debug, Clone, Copy)]
pub struct CompartmentConfig {
    /// Reject binds that would close a cycle
    pub cycle_check: bool,
    /// Which role-graph backend to instantiate
    pub backend: GraphBackend,
}

impl Default for CompartmentConfig {
    fn default() -> Self {
        CompartmentConfig {
            cycle_check: true,
            backend: GraphBackend::Adjacency,
        }
    }
}

/// Bounded context owning one role graph
#[derive(Debug)]
pub struct Compartment {
    config: CompartmentConfig,
    nodes: FxHashMap<NodeId, NodeSlot>,
    graph: Box<dyn RoleGraph>,
    restrictions: RestrictionTable,
}

impl Default for Compartment {
    fn default() -> Self {
        Compartment::new()
    }
}

impl Compartment {
    /// Create a compartment with the default configuration
    /// (cycle checking on, adjacency backend)
    pub fn new() -> Self {
        Compartment::with_config(CompartmentConfig::default())
    }

    /// Create a compartment with an explicit configuration
    pub fn with_config(config: CompartmentConfig) -> Self {
        Compartment {
            config,
            nodes: FxHashMap::default(),
            graph: config.backend.instantiate(config.cycle_check),
            restrictions: RestrictionTable::new(),
        }
    }

    /// The configuration this compartment was built with
    pub fn config(&self) -> &CompartmentConfig {
        &self.config
    }

    // ========== Wrapping ==========

    /// Wrap a value into the compartment, returning its handle
    ///
    /// The value's type must be registered with the type registry.
    /// Wrapping alone does not touch the graph; the node becomes part of
    /// play-relations once it is bound or plays a role.
    pub fn wrap<T: Send + Sync + 'static>(&mut self, value: T) -> Result<Player> {
        let key = registry()
            .key_of::<T>()
            .ok_or_else(|| Error::UnknownType(std::any::type_name::<T>().to_string()))?;
        Ok(self.insert_slot(Box::new(value), key, TypeId::of::<T>()))
    }

    /// Whether the handle resolves in this compartment
    pub fn contains(&self, player: Player) -> bool {
        self.nodes.contains_key(&player.node())
    }

    /// Registered type key of the wrapped value
    pub fn type_key_of(&self, player: Player) -> Result<TypeKey> {
        Ok(self.slot(player.node())?.key)
    }

    // ========== Bind / unbind ==========

    /// Bind a fresh role value to `core`, returning the role's handle
    ///
    /// Restriction validation runs before any slot or edge is created;
    /// on any failure nothing is mutated.
    pub fn play<T: Send + Sync + 'static>(&mut self, core: Player, role: T) -> Result<Player> {
        let core_key = self.type_key_of(core)?;
        let role_key = registry()
            .key_of::<T>()
            .ok_or_else(|| Error::UnknownType(std::any::type_name::<T>().to_string()))?;
        self.restrictions.validate(core_key, role_key)?;
        let role_player = self.insert_slot(Box::new(role), role_key, TypeId::of::<T>());
        match self.graph.add_binding(core.node(), role_player.node()) {
            Ok(()) => {
                debug!(
                    target: "troupe::compartment",
                    core = %core.node(),
                    role = %role_player.node(),
                    %role_key,
                    "Role bound"
                );
                Ok(role_player)
            }
            Err(err) => {
                self.nodes.remove(&role_player.node());
                Err(err)
            }
        }
    }

    /// Bind an already-wrapped node as a role of `core`
    pub fn bind(&mut self, core: Player, role: Player) -> Result<()> {
        let core_key = self.type_key_of(core)?;
        let role_key = self.type_key_of(role)?;
        self.restrictions.validate(core_key, role_key)?;
        self.graph.add_binding(core.node(), role.node())?;
        debug!(
            target: "troupe::compartment",
            core = %core.node(),
            role = %role.node(),
            "Role bound"
        );
        Ok(())
    }

    /// Remove the play-relation between `core` and `role`
    ///
    /// A role slot left fully disconnected is removed from the arena.
    pub fn drop_role(&mut self, core: Player, role: Player) -> Result<()> {
        self.graph.remove_binding(core.node(), role.node())?;
        if !self.graph.contains_node(role.node()) {
            self.nodes.remove(&role.node());
        }
        debug!(
            target: "troupe::compartment",
            core = %core.node(),
            role = %role.node(),
            "Role dropped"
        );
        Ok(())
    }

    /// Atomically rebind `role` from `from` to `to`
    ///
    /// Removes exactly the edge (from, role) and adds exactly (to, role);
    /// no other edge changes. All validation happens before mutation.
    pub fn transfer(&mut self, role: Player, from: Player, to: Player) -> Result<()> {
        if !self.graph.contains_edge(from.node(), role.node()) {
            return Err(Error::NotBound {
                core: from.node(),
                role: role.node(),
            });
        }
        let to_key = self.type_key_of(to)?;
        let role_key = self.type_key_of(role)?;
        self.restrictions.validate(to_key, role_key)?;
        self.check_rebind_cycle(role, to)?;
        self.graph.remove_binding(from.node(), role.node())?;
        self.graph.add_binding(to.node(), role.node())?;
        debug!(
            target: "troupe::compartment",
            role = %role.node(),
            from = %from.node(),
            to = %to.node(),
            "Role transferred"
        );
        Ok(())
    }

    /// Transfer the listed roles from `from` to `to`, all-or-nothing
    ///
    /// Every transfer is validated up front; only then is any edge moved.
    /// A role listed more than once transfers once.
    pub fn transfer_all(&mut self, from: Player, to: Player, roles: &[Player]) -> Result<()> {
        let to_key = self.type_key_of(to)?;
        let mut seen = FxHashSet::default();
        let mut pending = Vec::with_capacity(roles.len());
        for role in roles {
            if !seen.insert(role.node()) {
                continue;
            }
            if !self.graph.contains_edge(from.node(), role.node()) {
                return Err(Error::NotBound {
                    core: from.node(),
                    role: role.node(),
                });
            }
            let role_key = self.type_key_of(*role)?;
            self.restrictions.validate(to_key, role_key)?;
            self.check_rebind_cycle(*role, to)?;
            pending.push(*role);
        }
        for role in &pending {
            self.graph.remove_binding(from.node(), role.node())?;
            self.graph.add_binding(to.node(), role.node())?;
        }
        debug!(
            target: "troupe::compartment",
            from = %from.node(),
            to = %to.node(),
            count = pending.len(),
            "Roles transferred"
        );
        Ok(())
    }

    /// Reject a rebind that would close a cycle once the new edge exists
    ///
    /// Removing the old in-edge cannot shorten any path out of `role`, so
    /// reachability role -> to decides the question without mutating.
    fn check_rebind_cycle(&self, role: Player, to: Player) -> Result<()> {
        if self.config.cycle_check
            && (to.node() == role.node() || self.reaches(role.node(), to.node()))
        {
            return Err(Error::CycleDetected {
                core: to.node(),
                role: role.node(),
            });
        }
        Ok(())
    }

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
            stack.extend(self.graph.roles_of(node));
        }
        false
    }

    // ========== Composition ==========

    /// Absorb all play-relations of `other` into this compartment
    ///
    /// One-directional: node slots are shared by reference and edges are
    /// unioned; `other` is unchanged.
    pub fn part_of(&mut self, other: &Compartment) {
        let edges = other.graph.edges();
        for edge in &edges {
            self.adopt(other, edge.core);
            self.adopt(other, edge.role);
        }
        self.graph.merge(&edges);
        debug!(
            target: "troupe::compartment",
            edges = edges.len(),
            "Compartment merged"
        );
    }

    /// Bidirectional merge: each compartment absorbs the other's relations
    pub fn union(&mut self, other: &mut Compartment) {
        self.part_of(&*other);
        other.part_of(&*self);
    }

    /// Remove every play-relation that `other` also holds
    ///
    /// Edge subtraction by node identity; slots stay in the arena since
    /// surviving relations may still reference them.
    pub fn not_part_of(&mut self, other: &Compartment) {
        let edges = other.graph.edges();
        self.graph.subtract(&edges);
        debug!(
            target: "troupe::compartment",
            edges = edges.len(),
            "Compartment split"
        );
    }

    fn adopt(&mut self, other: &Compartment, node: NodeId) {
        if self.nodes.contains_key(&node) {
            return;
        }
        if let Some(slot) = other.nodes.get(&node) {
            self.nodes.insert(
                node,
                NodeSlot {
                    value: slot.value.clone(),
                    key: slot.key,
                    rust_type: slot.rust_type,
                },
            );
        }
    }

    // ========== Restrictions ==========

    /// Require roles played by `player_type` to satisfy `capabilities`
    ///
    /// Consulted on every subsequent bind for that player type; never
    /// expires.
    pub fn restrict(&mut self, player_type: TypeKey, capabilities: CapabilitySet) {
        self.restrictions.register(player_type, capabilities);
    }

    /// The restriction table of this compartment
    pub fn restrictions(&self) -> &RestrictionTable {
        &self.restrictions
    }

    // ========== Typed queries ==========

    /// All currently-bound players of type `T` admitted by `strategy`
    ///
    /// Players are "currently bound" when they participate in at least
    /// one play-relation. Results are in node order.
    pub fn all<T: 'static>(&self, strategy: &dyn QueryStrategy) -> Vec<Player> {
        let rust_type = TypeId::of::<T>();
        let mut matches: Vec<Player> = self
            .nodes
            .iter()
            .filter(|(node, slot)| slot.rust_type == rust_type && self.graph.contains_node(**node))
            .map(|(node, _)| Player::from_node(*node))
            .collect();
        matches.sort();
        matches.retain(|player| strategy.admits(self, *player));
        matches
    }

    /// The first currently-bound player of type `T` admitted by `strategy`
    ///
    /// When several players survive the filter, the one with the lowest
    /// node id wins; multiple survivors are not an error.
    ///
    /// # Errors
    ///
    /// Returns `CoreNotFound` if the filtered set is empty.
    pub fn one<T: 'static>(&self, strategy: &dyn QueryStrategy) -> Result<Player> {
        let key = registry()
            .key_of::<T>()
            .ok_or_else(|| Error::UnknownType(std::any::type_name::<T>().to_string()))?;
        self.all::<T>(strategy)
            .into_iter()
            .next()
            .ok_or(Error::CoreNotFound(key))
    }

    /// Whether a role of type `T` is directly bound to `player`
    pub fn is_playing<T: 'static>(&self, player: Player) -> bool {
        self.role_of::<T>(player).is_some()
    }

    /// The first directly bound role of type `T`, if any
    pub fn role_of<T: 'static>(&self, player: Player) -> Option<Player> {
        let rust_type = TypeId::of::<T>();
        self.graph
            .roles_of(player.node())
            .into_iter()
            .find(|node| {
                self.nodes
                    .get(node)
                    .map_or(false, |slot| slot.rust_type == rust_type)
            })
            .map(Player::from_node)
    }

    /// Roles directly bound to `player`, in binding order
    pub fn roles_of(&self, player: Player) -> Vec<Player> {
        self.graph
            .roles_of(player.node())
            .into_iter()
            .map(Player::from_node)
            .collect()
    }

    /// Resolve the ultimate core of `player`
    pub fn core_of(&self, player: Player) -> Result<Player> {
        dispatch::resolve_core(self, player.node()).map(Player::from_node)
    }

    /// All play-relations currently in the graph
    pub fn bindings(&self) -> Vec<PlaysEdge> {
        self.graph.edges()
    }

    // ========== Typed value access ==========

    /// Read the wrapped value of `player` as `T`
    pub fn with_value<T: 'static, R>(&self, player: Player, f: impl FnOnce(&T) -> R) -> Result<R> {
        let slot = self.slot(player.node())?;
        let guard = slot.value.read();
        let value = (**guard)
            .downcast_ref::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: slot.key.to_string(),
            })?;
        Ok(f(value))
    }

    /// Mutate the wrapped value of `player` as `T`
    pub fn with_value_mut<T: 'static, R>(
        &self,
        player: Player,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let slot = self.slot(player.node())?;
        let mut guard = slot.value.write();
        let value = (**guard)
            .downcast_mut::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: slot.key.to_string(),
            })?;
        Ok(f(value))
    }

    // ========== Dispatch ==========

    /// Call a member method on `player` through dynamic dispatch
    pub fn invoke(&self, player: Player, member: &str, args: &[Value]) -> Result<Value> {
        dispatch::invoke(self, player.node(), &DispatchQuery::default(), member, args)
    }

    /// Like [`invoke`](Self::invoke) with an explicit dispatch query
    pub fn invoke_with(
        &self,
        player: Player,
        query: &DispatchQuery,
        member: &str,
        args: &[Value],
    ) -> Result<Value> {
        dispatch::invoke(self, player.node(), query, member, args)
    }

    /// Read a field of `player` through dynamic dispatch
    pub fn get_field(&self, player: Player, field: &str) -> Result<Value> {
        dispatch::get_field(self, player.node(), &DispatchQuery::default(), field)
    }

    /// Like [`get_field`](Self::get_field) with an explicit dispatch query
    pub fn get_field_with(
        &self,
        player: Player,
        query: &DispatchQuery,
        field: &str,
    ) -> Result<Value> {
        dispatch::get_field(self, player.node(), query, field)
    }

    /// Update a field of `player` through dynamic dispatch
    pub fn set_field(&self, player: Player, field: &str, value: Value) -> Result<()> {
        dispatch::set_field(self, player.node(), &DispatchQuery::default(), field, value)
    }

    /// Like [`set_field`](Self::set_field) with an explicit dispatch query
    pub fn set_field_with(
        &self,
        player: Player,
        query: &DispatchQuery,
        field: &str,
        value: Value,
    ) -> Result<()> {
        dispatch::set_field(self, player.node(), query, field, value)
    }

    /// Borrowing dispatch wrapper for `player`
    pub fn view(&self, player: Player) -> PlayerView<'_> {
        PlayerView::new(self, player)
    }

    // ========== Internal ==========

    fn insert_slot(&mut self, value: Box<dyn Any + Send + Sync>, key: TypeKey, rust_type: TypeId) -> Player {
        let node = NodeId::next();
        self.nodes.insert(
            node,
            NodeSlot {
                value: Arc::new(RwLock::new(value)),
                key,
                rust_type,
            },
        );
        Player::from_node(node)
    }

    pub(crate) fn slot(&self, node: NodeId) -> Result<&NodeSlot> {
        self.nodes.get(&node).ok_or(Error::UnknownNode(node))
    }

    pub(crate) fn slot_value(&self, node: NodeId) -> Result<SlotValue> {
        Ok(self.slot(node)?.value.clone())
    }

    pub(crate) fn node_key(&self, node: NodeId) -> Option<TypeKey> {
        self.nodes.get(&node).map(|slot| slot.key)
    }

    pub(crate) fn contains_node_id(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub(crate) fn graph(&self) -> &dyn RoleGraph {
        self.graph.as_ref()
    }
}

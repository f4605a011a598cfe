//! Dynamic dispatch resolution
//!
//! Resolving a member access against a wrapped value proceeds in three
//! steps:
//!
//! 1. **Core resolution** — walk predecessor edges iteratively until a
//!    node with no predecessor is reached. More than one predecessor is a
//!    corrupted invariant and fails with `AmbiguousCore`.
//! 2. **Candidate ordering** — the sequence is the core's directly bound
//!    roles in the graph's native order, then the wrapped node, then the
//!    core itself; the active [`DispatchQuery`] reorders/filters it.
//! 3. **Member matching** — candidates are scanned in order against the
//!    metadata cache; the first candidate whose member matches by name,
//!    arity and argument assignability is invoked and its result returned.
//!    No further candidates are tried after a match.
//!
//! A `Handle` argument declared against a role type is substituted with
//! the sub-role of that type found among the argument's own candidates;
//! if none exists the whole resolution fails with `NoRoleForType`.

use crate::compartment::Compartment;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};
use troupe_core::{Error, NodeId, ParamType, Result, TypeKey, Value};
use troupe_meta::metadata;

/// Reordering/filtering applied to the candidate sequence
///
/// The default query is identity: native graph order, nothing filtered.
#[derive(Debug, Clone, Default)]
pub struct DispatchQuery {
    prefer: Vec<TypeKey>,
    bypass: Vec<TypeKey>,
}

impl DispatchQuery {
    /// Identity query
    pub fn new() -> Self {
        DispatchQuery::default()
    }

    /// Move candidates of the given type to the front
    ///
    /// Multiple preferred types keep the order they were declared in.
    pub fn prefer(mut self, key: TypeKey) -> Self {
        self.prefer.push(key);
        self
    }

    /// Exclude candidates of the given type entirely
    pub fn bypass(mut self, key: TypeKey) -> Self {
        self.bypass.push(key);
        self
    }

    /// Whether this query changes anything
    pub fn is_identity(&self) -> bool {
        self.prefer.is_empty() && self.bypass.is_empty()
    }

    pub(crate) fn arrange(&self, compartment: &Compartment, mut seq: Vec<NodeId>) -> Vec<NodeId> {
        if self.is_identity() {
            return seq;
        }
        if !self.bypass.is_empty() {
            seq.retain(|node| {
                compartment
                    .node_key(*node)
                    .map_or(true, |key| !self.bypass.contains(&key))
            });
        }
        if self.prefer.is_empty() {
            return seq;
        }
        let mut arranged = Vec::with_capacity(seq.len());
        for key in &self.prefer {
            for node in &seq {
                if compartment.node_key(*node) == Some(*key) && !arranged.contains(node) {
                    arranged.push(*node);
                }
            }
        }
        for node in seq {
            if !arranged.contains(&node) {
                arranged.push(node);
            }
        }
        arranged
    }
}

/// Resolve the ultimate core of `node` by walking predecessor edges
///
/// Iterative, so chain length only costs time, never stack. A node with
/// more than one predecessor aborts with `AmbiguousCore`; revisiting a
/// node (possible only with cycle checking disabled) aborts with
/// `CycleDetected` instead of looping.
pub(crate) fn resolve_core(compartment: &Compartment, node: NodeId) -> Result<NodeId> {
    if !compartment.contains_node_id(node) {
        return Err(Error::UnknownNode(node));
    }
    let mut visited = FxHashSet::default();
    let mut current = node;
    loop {
        if !visited.insert(current) {
            return Err(Error::CycleDetected {
                core: current,
                role: node,
            });
        }
        let predecessors = compartment.graph().predecessors_of(current);
        match predecessors.len() {
            0 => return Ok(current),
            1 => current = predecessors[0],
            n => {
                warn!(
                    target: "troupe::dispatch",
                    node = %current,
                    predecessors = n,
                    "Core resolution hit a node with multiple predecessors"
                );
                return Err(Error::AmbiguousCore {
                    node: current,
                    predecessors: n,
                });
            }
        }
    }
}

/// Build the ordered, query-arranged candidate sequence for `node`
///
/// Returns the resolved core alongside the sequence so failure reporting
/// can name it.
pub(crate) fn candidates(
    compartment: &Compartment,
    node: NodeId,
    query: &DispatchQuery,
) -> Result<(NodeId, Vec<NodeId>)> {
    let core = resolve_core(compartment, node)?;
    let mut seq = compartment.graph().roles_of(core);
    seq.push(node);
    seq.push(core);
    let mut seen = FxHashSet::default();
    seq.retain(|n| seen.insert(*n));
    Ok((core, query.arrange(compartment, seq)))
}

/// Resolve and invoke a member method
pub(crate) fn invoke(
    compartment: &Compartment,
    node: NodeId,
    query: &DispatchQuery,
    member: &str,
    args: &[Value],
) -> Result<Value> {
    let (core, seq) = candidates(compartment, node, query)?;
    trace!(target: "troupe::dispatch", %node, %core, member, arity = args.len(), "Resolving call");
    for candidate in seq {
        let Some(key) = compartment.node_key(candidate) else {
            continue;
        };
        let members = metadata().members_of(key)?;
        let Some(entry) = members.method(member, args.len()).cloned() else {
            continue;
        };
        let Some(call_args) = match_args(compartment, &entry.params, args)? else {
            continue;
        };
        trace!(target: "troupe::dispatch", %candidate, %key, member, "Dispatching to first match");
        let value = compartment.slot_value(candidate)?;
        let mut guard = value.write();
        return (entry.invoke)(&mut **guard, &call_args);
    }
    Err(Error::NoSuchMember {
        member: member.to_string(),
        core,
    })
}

/// Resolve a field read
pub(crate) fn get_field(
    compartment: &Compartment,
    node: NodeId,
    query: &DispatchQuery,
    field: &str,
) -> Result<Value> {
    let (core, seq) = candidates(compartment, node, query)?;
    for candidate in seq {
        let Some(key) = compartment.node_key(candidate) else {
            continue;
        };
        let members = metadata().members_of(key)?;
        let Some(entry) = members.field(field).cloned() else {
            continue;
        };
        let value = compartment.slot_value(candidate)?;
        let guard = value.read();
        return Ok((entry.get)(&**guard));
    }
    Err(Error::NoSuchMember {
        member: field.to_string(),
        core,
    })
}

/// Resolve a field write through the same ownership path as reads
pub(crate) fn set_field(
    compartment: &Compartment,
    node: NodeId,
    query: &DispatchQuery,
    field: &str,
    new_value: Value,
) -> Result<()> {
    let (core, seq) = candidates(compartment, node, query)?;
    for candidate in seq {
        let Some(key) = compartment.node_key(candidate) else {
            continue;
        };
        let members = metadata().members_of(key)?;
        let Some(entry) = members.field(field).cloned() else {
            continue;
        };
        let Some(set) = entry.set.as_ref() else {
            return Err(Error::ImmutableField {
                field: field.to_string(),
            });
        };
        let value = compartment.slot_value(candidate)?;
        let mut guard = value.write();
        return set(&mut **guard, new_value);
    }
    Err(Error::NoSuchMember {
        member: field.to_string(),
        core,
    })
}

/// Check argument assignability and perform role-typed substitution
///
/// `Ok(None)` means this candidate does not match and the scan continues.
/// `NoRoleForType` aborts the whole resolution, per the substitution
/// contract.
fn match_args(
    compartment: &Compartment,
    params: &[ParamType],
    args: &[Value],
) -> Result<Option<Vec<Value>>> {
    debug_assert_eq!(params.len(), args.len());
    let mut resolved = Vec::with_capacity(args.len());
    for (param, arg) in params.iter().zip(args) {
        if let Some(expected) = param.role_type() {
            match arg {
                Value::Handle(handle) => {
                    let substituted = substitute_role(compartment, *handle, expected)?;
                    resolved.push(Value::Handle(substituted));
                }
                _ => return Ok(None),
            }
        } else if param.accepts(arg) {
            resolved.push(arg.clone());
        } else {
            return Ok(None);
        }
    }
    Ok(Some(resolved))
}

/// Unwrap a handle argument to its sub-role of the expected type
fn substitute_role(
    compartment: &Compartment,
    handle: NodeId,
    expected: TypeKey,
) -> Result<NodeId> {
    let core = resolve_core(compartment, handle)?;
    let mut candidates = compartment.graph().roles_of(core);
    candidates.push(handle);
    candidates.push(core);
    candidates
        .into_iter()
        .find(|node| compartment.node_key(*node) == Some(expected))
        .ok_or(Error::NoRoleForType { expected })
}

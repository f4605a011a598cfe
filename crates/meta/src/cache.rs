//! Reflective metadata cache
//!
//! Maintains, per registered type, the full member set including inherited
//! members, computed once by walking the descriptor parent chain and
//! merging tables, then memoized. Subsequent lookups filter from the
//! cached set instead of re-walking the chain.
//!
//! Inherited entries are wrapped with the composed child-to-ancestor
//! projection at merge time, so the dispatch engine invokes every entry
//! against the slot's concrete receiver without caring where in the chain
//! it was declared.
//!
//! The cache is purely additive: a type's member set is immutable for the
//! process lifetime, so entries are never invalidated. This keeps the
//! dispatch hot path free of introspection cost.

use crate::descriptor::{
    FieldEntry, FieldGetFn, FieldSetFn, MethodEntry, MethodFn, ProjectMut, ProjectRef,
    TypeDescriptor,
};
use crate::registry::{registry, TypeRegistry};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::trace;
use troupe_core::{Error, MemberSig, Result, TypeKey, Value};

/// Fully merged member set of one type (declared + inherited)
#[derive(Debug, Default, Clone)]
pub struct MemberSet {
    methods: FxHashMap<(String, usize), Arc<MethodEntry>>,
    fields: FxHashMap<String, Arc<FieldEntry>>,
}

impl MemberSet {
    /// Look up a method by name and arity
    pub fn method(&self, name: &str, arity: usize) -> Option<&Arc<MethodEntry>> {
        self.methods.get(&(name.to_string(), arity))
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Arc<FieldEntry>> {
        self.fields.get(name)
    }

    /// Whether the set contains the given signature
    pub fn contains(&self, sig: &MemberSig) -> bool {
        match sig.arity {
            Some(arity) => self.methods.contains_key(&(sig.name.clone(), arity)),
            None => self.fields.contains_key(&sig.name),
        }
    }

    /// All signatures in the set
    pub fn signatures(&self) -> Vec<MemberSig> {
        self.methods
            .values()
            .map(|m| m.sig())
            .chain(self.fields.values().map(|f| f.sig()))
            .collect()
    }

    /// Total member count
    pub fn len(&self) -> usize {
        self.methods.len() + self.fields.len()
    }

    /// True when the type declares no members
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.fields.is_empty()
    }
}

/// Projection pair from the concrete receiver to one chain level
type Projection = Option<(ProjectRef, ProjectMut)>;

fn projection_error() -> Error {
    Error::TypeMismatch {
        expected: "projectable receiver".to_string(),
        actual: "foreign receiver".to_string(),
    }
}

/// Re-target a method entry at the concrete child receiver
fn project_method(entry: &Arc<MethodEntry>, projection: &Projection) -> Arc<MethodEntry> {
    let Some((_, project_mut)) = projection else {
        return entry.clone();
    };
    let inner: MethodFn = entry.invoke.clone();
    let project_mut = project_mut.clone();
    Arc::new(MethodEntry {
        name: entry.name.clone(),
        params: entry.params.clone(),
        invoke: Arc::new(move |recv, args| {
            let recv = project_mut(recv).ok_or_else(projection_error)?;
            inner(recv, args)
        }),
    })
}

/// Re-target a field entry at the concrete child receiver
fn project_field(entry: &Arc<FieldEntry>, projection: &Projection) -> Arc<FieldEntry> {
    let Some((project_ref, project_mut)) = projection else {
        return entry.clone();
    };
    let get_inner: FieldGetFn = entry.get.clone();
    let project_ref = project_ref.clone();
    let get: FieldGetFn = Arc::new(move |recv| match project_ref(recv) {
        Some(recv) => get_inner(recv),
        None => Value::Unit,
    });
    let set = entry.set.as_ref().map(|set_inner| {
        let set_inner: FieldSetFn = set_inner.clone();
        let project_mut = project_mut.clone();
        let set: FieldSetFn = Arc::new(move |recv, value| {
            let recv = project_mut(recv).ok_or_else(projection_error)?;
            set_inner(recv, value)
        });
        set
    });
    Arc::new(FieldEntry {
        name: entry.name.clone(),
        get,
        set,
    })
}

/// Memoized member sets per type key
#[derive(Debug, Default)]
pub struct MetadataCache {
    sets: DashMap<TypeKey, Arc<MemberSet>>,
}

impl MetadataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        MetadataCache::default()
    }

    /// Merged member set of `key`, computed on first use
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if `key` (or a named parent) was never
    /// registered.
    pub fn members_of(&self, key: TypeKey) -> Result<Arc<MemberSet>> {
        self.members_of_in(registry(), key)
    }

    /// Like [`members_of`](Self::members_of) against an explicit registry
    pub fn members_of_in(&self, reg: &TypeRegistry, key: TypeKey) -> Result<Arc<MemberSet>> {
        if let Some(cached) = self.sets.get(&key) {
            return Ok(cached.clone());
        }

        // Walk child -> root, composing the projection from the concrete
        // receiver to each chain level as we go.
        let mut chain: Vec<(Arc<TypeDescriptor>, Projection)> = Vec::new();
        let mut seen = FxHashSet::default();
        let mut cursor = Some(key);
        let mut projection: Projection = None;
        while let Some(current) = cursor {
            if !seen.insert(current) {
                // Malformed parent cycle; stop at the repeat.
                break;
            }
            let descriptor = reg
                .lookup(current)
                .ok_or_else(|| Error::UnknownType(current.name().to_string()))?;
            let next = descriptor.parent().map(|link| {
                let step = match &projection {
                    None => (link.project_ref.clone(), link.project_mut.clone()),
                    Some((outer_ref, outer_mut)) => {
                        let (outer_ref, outer_mut) = (outer_ref.clone(), outer_mut.clone());
                        let (inner_ref, inner_mut) =
                            (link.project_ref.clone(), link.project_mut.clone());
                        let composed_ref: ProjectRef =
                            Arc::new(move |any| outer_ref(any).and_then(|mid| inner_ref(mid)));
                        let composed_mut: ProjectMut =
                            Arc::new(move |any| outer_mut(any).and_then(|mid| inner_mut(mid)));
                        (composed_ref, composed_mut)
                    }
                };
                (link.key, step)
            });
            chain.push((descriptor, projection.clone()));
            match next {
                Some((parent_key, step)) => {
                    projection = Some(step);
                    cursor = Some(parent_key);
                }
                None => cursor = None,
            }
        }

        // Overlay root-first so child entries shadow parent entries.
        let mut set = MemberSet::default();
        for (descriptor, projection) in chain.iter().rev() {
            for (sig, entry) in descriptor.method_map() {
                set.methods
                    .insert(sig.clone(), project_method(entry, projection));
            }
            for (name, entry) in descriptor.field_map() {
                set.fields
                    .insert(name.clone(), project_field(entry, projection));
            }
        }

        trace!(target: "troupe::meta", %key, members = set.len(), "Member set memoized");
        let set = Arc::new(set);
        // entry() keeps the winner if two threads raced to compute.
        Ok(self.sets.entry(key).or_insert(set).clone())
    }

    /// Number of memoized types
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True if nothing is memoized yet
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

static METADATA: Lazy<MetadataCache> = Lazy::new(MetadataCache::new);

/// The process-wide metadata cache instance
pub fn metadata() -> &'static MetadataCache {
    &METADATA
}

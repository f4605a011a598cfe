//! Process-wide type registry
//!
//! The registry maps stable type keys to dispatch tables and Rust
//! `TypeId`s to keys. It is populated at role-type definition time and
//! read on every wrap/bind/dispatch, so lookups are sharded reads.
//!
//! ## Usage
//!
//! ```rust,ignore
//! registry().register(
//!     TypeDescriptor::builder::<Account>("Account")
//!         .method("balance", &[], |a, _| Ok(Value::Int(a.balance)))
//!         .build(),
//! );
//!
//! let key = registry().key_of::<Account>().unwrap();
//! let desc = registry().lookup(key).unwrap();
//! ```

use crate::descriptor::TypeDescriptor;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;
use troupe_core::TypeKey;

/// Registry of role/player type descriptors
///
/// Registration is idempotent by key: registering a key that already
/// exists keeps the first descriptor, so fixture setup can run from
/// multiple call sites without coordination.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_key: DashMap<TypeKey, Arc<TypeDescriptor>>,
    by_type: DashMap<TypeId, TypeKey>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Register a descriptor, returning its key
    ///
    /// A key that is already present keeps its existing descriptor.
    pub fn register(&self, descriptor: TypeDescriptor) -> TypeKey {
        let key = descriptor.key();
        if self.by_key.contains_key(&key) {
            return key;
        }
        debug!(target: "troupe::meta", %key, rust_type = descriptor.type_name(), "Type registered");
        self.by_type.insert(descriptor.type_id(), key);
        self.by_key.insert(key, Arc::new(descriptor));
        key
    }

    /// Look up a descriptor by key
    pub fn lookup(&self, key: TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.by_key.get(&key).map(|entry| entry.clone())
    }

    /// Key registered for the concrete Rust type `T`
    pub fn key_of<T: 'static>(&self) -> Option<TypeKey> {
        self.key_of_type_id(TypeId::of::<T>())
    }

    /// Key registered for a runtime `TypeId`
    pub fn key_of_type_id(&self, type_id: TypeId) -> Option<TypeKey> {
        self.by_type.get(&type_id).map(|entry| *entry)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

static REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

/// The process-wide registry instance
pub fn registry() -> &'static TypeRegistry {
    &REGISTRY
}

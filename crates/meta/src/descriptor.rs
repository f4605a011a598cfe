//! Per-type dispatch tables
//!
//! A `TypeDescriptor` is built once, at role-type registration time, and
//! records every callable member of the type keyed by (name, arity) for
//! methods and by name for fields. Member access never reflects over the
//! concrete type at dispatch time; it goes through these tables.
//!
//! ## Inheritance
//!
//! A descriptor may name a parent type together with a pair of projection
//! functions from the child value to its embedded parent value. The
//! metadata cache merges member tables over the parent chain (child
//! entries shadow parent entries with the same signature) and wraps
//! inherited entries with the composed projection, so inherited members
//! are invocable on a child receiver.

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use troupe_core::{Error, MemberSig, ParamType, Result, TypeKey, Value};

/// Boxed method implementation operating on the type-erased receiver
pub type MethodFn = Arc<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value> + Send + Sync>;

/// Boxed field getter
pub type FieldGetFn = Arc<dyn Fn(&dyn Any) -> Value + Send + Sync>;

/// Boxed field setter
pub type FieldSetFn = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;

/// Shared projection from a child receiver to its embedded parent
pub type ProjectRef = Arc<dyn Fn(&dyn Any) -> Option<&dyn Any> + Send + Sync>;

/// Mutable projection from a child receiver to its embedded parent
pub type ProjectMut = Arc<dyn Fn(&mut dyn Any) -> Option<&mut dyn Any> + Send + Sync>;

/// Link from a type to the parent whose members it inherits
#[derive(Clone)]
pub struct ParentLink {
    /// The parent's registered key
    pub key: TypeKey,
    /// Project a child value to the parent value
    pub project_ref: ProjectRef,
    /// Project a child value to the parent value, mutably
    pub project_mut: ProjectMut,
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentLink").field("key", &self.key).finish_non_exhaustive()
    }
}

/// A single registered method
#[derive(Clone)]
pub struct MethodEntry {
    /// Method name
    pub name: String,
    /// Declared parameter types, in positional order
    pub params: Vec<ParamType>,
    /// The implementation
    pub invoke: MethodFn,
}

impl MethodEntry {
    /// Signature of this method
    pub fn sig(&self) -> MemberSig {
        MemberSig::method(self.name.clone(), self.params.len())
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A single registered field
#[derive(Clone)]
pub struct FieldEntry {
    /// Field name
    pub name: String,
    /// Getter
    pub get: FieldGetFn,
    /// Setter; None marks the field read-only
    pub set: Option<FieldSetFn>,
}

impl FieldEntry {
    /// Signature of this field
    pub fn sig(&self) -> MemberSig {
        MemberSig::field(self.name.clone())
    }
}

impl fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.name)
            .field("mutable", &self.set.is_some())
            .finish_non_exhaustive()
    }
}

/// Dispatch table for one registered role/player type
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    type_id: TypeId,
    type_name: &'static str,
    parent: Option<ParentLink>,
    methods: FxHashMap<(String, usize), Arc<MethodEntry>>,
    fields: FxHashMap<String, Arc<FieldEntry>>,
}

impl TypeDescriptor {
    /// Start building a descriptor for `T` under the given stable key
    pub fn builder<T: 'static>(key: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            descriptor: TypeDescriptor {
                key: TypeKey::new(key),
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                parent: None,
                methods: FxHashMap::default(),
                fields: FxHashMap::default(),
            },
            _marker: std::marker::PhantomData,
        }
    }

    /// The stable key this type is registered under
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Runtime type id of the concrete Rust type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Link to the declared parent type, if any
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Key of the declared parent type, if any
    pub fn parent_key(&self) -> Option<TypeKey> {
        self.parent.as_ref().map(|link| link.key)
    }

    /// Methods declared directly on this type
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodEntry>> {
        self.methods.values()
    }

    /// Fields declared directly on this type
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldEntry>> {
        self.fields.values()
    }

    pub(crate) fn method_map(&self) -> &FxHashMap<(String, usize), Arc<MethodEntry>> {
        &self.methods
    }

    pub(crate) fn field_map(&self) -> &FxHashMap<String, Arc<FieldEntry>> {
        &self.fields
    }
}

/// Builder for [`TypeDescriptor`]
///
/// Method and field closures are written against the concrete type; the
/// builder wraps them with the downcast from the type-erased receiver.
pub struct DescriptorBuilder<T: 'static> {
    descriptor: TypeDescriptor,
    _marker: std::marker::PhantomData<fn(&mut T)>,
}

impl<T: 'static> DescriptorBuilder<T> {
    /// Declare the parent type whose members this type inherits
    ///
    /// The two projections locate the embedded parent value inside the
    /// child; inherited members run against that projection.
    pub fn parent<P: 'static>(
        mut self,
        key: &'static str,
        as_ref: fn(&T) -> &P,
        as_mut: fn(&mut T) -> &mut P,
    ) -> Self {
        let project_ref: ProjectRef =
            Arc::new(move |any| any.downcast_ref::<T>().map(|t| as_ref(t) as &dyn Any));
        let project_mut: ProjectMut =
            Arc::new(move |any| any.downcast_mut::<T>().map(|t| as_mut(t) as &mut dyn Any));
        self.descriptor.parent = Some(ParentLink {
            key: TypeKey::new(key),
            project_ref,
            project_mut,
        });
        self
    }

    /// Register a method with the given declared parameter types
    pub fn method<F>(mut self, name: &str, params: &[ParamType], body: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let type_name = self.descriptor.type_name;
        let invoke: MethodFn = Arc::new(move |recv, args| {
            let recv = recv.downcast_mut::<T>().ok_or_else(|| Error::TypeMismatch {
                expected: type_name.to_string(),
                actual: "foreign receiver".to_string(),
            })?;
            body(recv, args)
        });
        let entry = MethodEntry {
            name: name.to_string(),
            params: params.to_vec(),
            invoke,
        };
        self.descriptor
            .methods
            .insert((name.to_string(), params.len()), Arc::new(entry));
        self
    }

    /// Register a read-only field
    pub fn field<G>(self, name: &str, get: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.field_inner(name, get, None::<fn(&mut T, Value) -> Result<()>>)
    }

    /// Register a mutable field
    pub fn field_mut<G, S>(self, name: &str, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.field_inner(name, get, Some(set))
    }

    fn field_inner<G, S>(mut self, name: &str, get: G, set: Option<S>) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        let type_name = self.descriptor.type_name;
        let getter: FieldGetFn = Arc::new(move |recv| match recv.downcast_ref::<T>() {
            Some(recv) => get(recv),
            // Unreachable through dispatch; slots always hold the
            // descriptor's concrete type.
            None => Value::Unit,
        });
        let setter: Option<FieldSetFn> = set.map(|set| {
            let set_fn: FieldSetFn = Arc::new(move |recv: &mut dyn Any, value: Value| {
                let recv = recv.downcast_mut::<T>().ok_or_else(|| Error::TypeMismatch {
                    expected: type_name.to_string(),
                    actual: "foreign receiver".to_string(),
                })?;
                set(recv, value)
            });
            set_fn
        });
        let entry = FieldEntry {
            name: name.to_string(),
            get: getter,
            set: setter,
        };
        self.descriptor.fields.insert(name.to_string(), Arc::new(entry));
        self
    }

    /// Finish building
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

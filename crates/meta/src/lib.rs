//! Type metadata for Troupe
//!
//! This crate owns the reflective side of the role engine:
//! - TypeDescriptor: per-type dispatch tables built at registration time
//! - TypeRegistry: process-wide key/TypeId indexes
//! - MetadataCache: additive memoization of merged member sets
//!
//! Dispatch consults only these tables; no runtime reflection happens on
//! the hot path.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod descriptor;
pub mod registry;

pub use cache::{metadata, MemberSet, MetadataCache};
pub use descriptor::{
    DescriptorBuilder, FieldEntry, FieldGetFn, FieldSetFn, MethodEntry, MethodFn, ParentLink,
    ProjectMut, ProjectRef, TypeDescriptor,
};
pub use registry::{registry, TypeRegistry};

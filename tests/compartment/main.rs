//! Compartment Integration Tests
//!
//! Binding lifecycle, graph-backend equivalence, compartment composition,
//! role restrictions, and typed queries.

#[path = "../common/mod.rs"]
mod common;

mod bindings;

//! Role restrictions
//!
//! A restriction declares, per player type, a structural capability set
//! (member signatures) that any role bound to a player of that type must
//! satisfy. The table is consulted on every bind attempt for a matching
//! player type; restrictions never expire.
//!
//! Validation compares against the role type's merged member set from the
//! metadata cache, so inherited members count toward a capability.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use troupe_core::{CapabilitySet, Error, MemberSig, Result, TypeKey};
use troupe_meta::metadata;

/// Per-compartment registry of role restrictions
#[derive(Debug, Default)]
pub struct RestrictionTable {
    required: FxHashMap<TypeKey, CapabilitySet>,
}

impl RestrictionTable {
    /// Create an empty table
    pub fn new() -> Self {
        RestrictionTable::default()
    }

    /// Register the capability set required of roles played by `player_type`
    ///
    /// Re-registering a type replaces its requirement.
    pub fn register(&mut self, player_type: TypeKey, capabilities: CapabilitySet) {
        debug!(
            target: "troupe::restriction",
            %player_type,
            required = capabilities.len(),
            "Restriction registered"
        );
        self.required.insert(player_type, capabilities);
    }

    /// The capability set registered for `player_type`, if any
    pub fn get(&self, player_type: TypeKey) -> Option<&CapabilitySet> {
        self.required.get(&player_type)
    }

    /// Validate a bind of a `role_type` role under a `player_type` core
    ///
    /// # Errors
    ///
    /// Returns `RestrictionViolation` listing the missing signatures, or
    /// `UnknownType` if `role_type` was never registered.
    pub fn validate(&self, player_type: TypeKey, role_type: TypeKey) -> Result<()> {
        let Some(required) = self.required.get(&player_type) else {
            return Ok(());
        };
        let members = metadata().members_of(role_type)?;
        let missing: Vec<MemberSig> = required
            .iter()
            .filter(|sig| !members.contains(sig))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            warn!(
                target: "troupe::restriction",
                %player_type,
                %role_type,
                ?missing,
                "Bind rejected by restriction"
            );
            Err(Error::RestrictionViolation {
                player_type,
                missing,
            })
        }
    }

    /// Number of registered restrictions
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// True if no restriction is registered
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

//! Domain registry and role checks.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use stakegov_types::{domain, Address};
use std::collections::BTreeMap;

/// Read side of the registry, as consumed by the components.
pub trait Registry {
    /// The identity currently published under `domain`, or the null address.
    fn resolve(&self, domain: &str) -> Address;

    /// Whether `identity` holds the coarse permission flag for `domain`.
    fn has_permission(&self, domain: &str, identity: &Address) -> bool;
}

/// Whether `caller` currently acts as the governance engine.
///
/// Re-resolved on every call so that a re-pointed registry takes effect
/// immediately.
pub fn is_governance(registry: &dyn Registry, caller: &Address) -> bool {
    if caller.is_zero() {
        return false;
    }
    registry.resolve(domain::GOVERNANCE) == *caller
        || registry.has_permission(domain::GOVERNANCE, caller)
}

/// Owner-administered registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContractRegistry {
    owner: Address,
    contracts: BTreeMap<String, Address>,
    permissions: BTreeMap<(String, Address), bool>,
}

impl ContractRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            contracts: BTreeMap::new(),
            permissions: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Publish `address` under `name`, replacing any previous holder.
    pub fn set_contract_domain(
        &mut self,
        caller: &Address,
        name: &str,
        address: Address,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        if name.is_empty() {
            return Err(RegistryError::EmptyDomain);
        }
        let previous = self.contracts.insert(name.to_string(), address);
        tracing::info!(domain = name, %address, previous = ?previous, "contract domain set");
        Ok(())
    }

    pub fn set_permission(
        &mut self,
        caller: &Address,
        name: &str,
        identity: Address,
        allowed: bool,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        if name.is_empty() {
            return Err(RegistryError::EmptyDomain);
        }
        self.permissions
            .insert((name.to_string(), identity), allowed);
        tracing::info!(domain = name, %identity, allowed, "permission set");
        Ok(())
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), RegistryError> {
        if *caller != self.owner {
            return Err(RegistryError::NotOwner(*caller));
        }
        Ok(())
    }

    pub fn save_state(&self) -> Result<Vec<u8>, RegistryError> {
        bincode::serialize(self).map_err(|e| RegistryError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, RegistryError> {
        bincode::deserialize(data).map_err(|e| RegistryError::Snapshot(e.to_string()))
    }
}

impl Registry for ContractRegistry {
    fn resolve(&self, domain: &str) -> Address {
        self.contracts.get(domain).copied().unwrap_or(Address::ZERO)
    }

    fn has_permission(&self, domain: &str, identity: &Address) -> bool {
        self.permissions
            .get(&(domain.to_string(), *identity))
            .copied()
            .unwrap_or(false)
    }
}

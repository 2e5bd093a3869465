//! The environment variable store.

use crate::error::EnvError;
use crate::variable::EnvVariable;
use serde::{Deserialize, Serialize};
use stakegov_registry::{is_governance, Registry};
use stakegov_types::{Address, VarType};
use std::collections::BTreeMap;

/// Whether a write created the variable or replaced an existing value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableChange {
    Added,
    Changed,
}

/// Write/read surface the governance engine depends on.
pub trait EnvironmentStore {
    /// Write `name`. Only the governance identity may call this.
    fn set_variable(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        name: &str,
        var_type: VarType,
        value: Vec<u8>,
    ) -> Result<VariableChange, EnvError>;

    fn get_variable(&self, name: &str) -> Option<&EnvVariable>;
}

/// In-process environment storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvStorage {
    address: Address,
    variables: BTreeMap<String, EnvVariable>,
}

impl EnvStorage {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            variables: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn get_type(&self, name: &str) -> VarType {
        self.variables
            .get(name)
            .map(|v| v.var_type)
            .unwrap_or(VarType::Invalid)
    }

    /// Raw value, empty when unset.
    pub fn get_value(&self, name: &str) -> &[u8] {
        self.variables
            .get(name)
            .map(|v| v.value.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn save_state(&self) -> Result<Vec<u8>, EnvError> {
        bincode::serialize(self).map_err(|e| EnvError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, EnvError> {
        bincode::deserialize(data).map_err(|e| EnvError::Snapshot(e.to_string()))
    }
}

impl EnvironmentStore for EnvStorage {
    fn set_variable(
        &mut self,
        registry: &dyn Registry,
        caller: &Address,
        name: &str,
        var_type: VarType,
        value: Vec<u8>,
    ) -> Result<VariableChange, EnvError> {
        if !is_governance(registry, caller) {
            return Err(EnvError::Unauthorized(*caller));
        }
        if name.is_empty() {
            return Err(EnvError::EmptyName);
        }
        let variable = EnvVariable::new(var_type, value)?;
        let change = match self.variables.insert(name.to_string(), variable) {
            None => VariableChange::Added,
            Some(_) => VariableChange::Changed,
        };
        tracing::info!(name, ?var_type, ?change, "environment variable written");
        Ok(change)
    }

    fn get_variable(&self, name: &str) -> Option<&EnvVariable> {
        self.variables.get(name)
    }
}

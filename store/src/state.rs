//! Snapshot storage trait.

use crate::StoreError;

/// Fixed keys under which each component's snapshot is written.
pub mod keys {
    pub const REGISTRY: &str = "registry";
    pub const STAKING: &str = "staking";
    pub const BALLOTS: &str = "ballot_storage";
    pub const RETIRED_BALLOTS: &str = "retired_ballot_storages";
    pub const ENV: &str = "env_storage";
    pub const ENGINE: &str = "governance_engine";
    pub const SCHEMA_VERSION: &str = "schema_version";
}

/// Key-value store for component snapshots.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the staking, ballot
/// or governance crates; each component serializes its own state.
pub trait StateStore {
    /// Store a snapshot under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a snapshot. `Ok(None)` when nothing was ever written.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn delete_state(&self, key: &str) -> Result<(), StoreError>;

    /// Store several snapshots in one write. Backends with transactions make
    /// this atomic; the default writes them one by one.
    fn put_batch(&self, entries: &[(&str, Vec<u8>)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.put_state(key, value)?;
        }
        Ok(())
    }

    /// Get a snapshot that must exist.
    fn require_state(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.get_state(key)?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

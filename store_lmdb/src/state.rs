//! LMDB implementation of StateStore.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env};

use stakegov_store::{StateStore, StoreError};

use crate::LmdbError;

pub struct LmdbStateStore {
    pub(crate) env: Arc<Env>,
    pub(crate) state_db: Database<Str, Bytes>,
}

impl StateStore for LmdbStateStore {
    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.state_db
            .put(&mut wtxn, key, value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .state_db
            .get(&rtxn, key)
            .map_err(LmdbError::from)?
            .map(|bytes| bytes.to_vec());
        Ok(val)
    }

    fn delete_state(&self, key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.state_db
            .delete(&mut wtxn, key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    /// All entries go through one write transaction: either every snapshot
    /// lands or none does.
    fn put_batch(&self, entries: &[(&str, Vec<u8>)]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, value) in entries {
            self.state_db
                .put(&mut wtxn, key, value)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use stakegov_store::keys;

    /// Helper: open a temporary LMDB environment.
    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024)
            .expect("failed to open env");
        (dir, env)
    }

    #[test]
    fn put_then_get_returns_bytes() {
        let (_dir, env) = temp_env();
        let store = env.state_store();
        store.put_state(keys::STAKING, b"ledger-bytes").unwrap();
        assert_eq!(
            store.get_state(keys::STAKING).unwrap().as_deref(),
            Some(&b"ledger-bytes"[..])
        );
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, env) = temp_env();
        let store = env.state_store();
        assert!(store.get_state(keys::ENGINE).unwrap().is_none());
        assert!(store.require_state(keys::ENGINE).is_err());
    }

    #[test]
    fn batch_writes_all_entries() {
        let (_dir, env) = temp_env();
        let store = env.state_store();
        store
            .put_batch(&[(keys::STAKING, vec![1, 2]), (keys::BALLOTS, vec![3])])
            .unwrap();
        assert_eq!(store.get_state(keys::STAKING).unwrap(), Some(vec![1, 2]));
        assert_eq!(store.get_state(keys::BALLOTS).unwrap(), Some(vec![3]));
    }

    #[test]
    fn delete_removes_entry() {
        let (_dir, env) = temp_env();
        let store = env.state_store();
        store.put_state(keys::ENV, b"x").unwrap();
        store.delete_state(keys::ENV).unwrap();
        assert!(store.get_state(keys::ENV).unwrap().is_none());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024).unwrap();
            env.state_store().put_state(keys::REGISTRY, b"reg").unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024).unwrap();
        assert_eq!(
            env.state_store().get_state(keys::REGISTRY).unwrap(),
            Some(b"reg".to_vec())
        );
    }
}

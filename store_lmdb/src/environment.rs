//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::migration::Migrator;
use crate::state::LmdbStateStore;
use crate::LmdbError;

const STATE_DB_NAME: &str = "state";

/// Wraps the LMDB environment and the snapshot database handle.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    state_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per path by this process and
        // never memory-mapped twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let state_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some(STATE_DB_NAME))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        let environment = Self {
            env: Arc::new(env),
            state_db,
        };
        Migrator::run(&environment.state_store())?;
        Ok(environment)
    }

    /// A `StateStore` handle sharing this environment.
    pub fn state_store(&self) -> LmdbStateStore {
        LmdbStateStore {
            env: Arc::clone(&self.env),
            state_db: self.state_db,
        }
    }
}

//! Snapshot schema versioning.
//!
//! A big-endian `u32` under [`keys::SCHEMA_VERSION`] records the layout the
//! snapshots were written with. Opening a database written by a newer release
//! is refused; older layouts are stepped forward one version at a time.

use stakegov_store::{keys, StateStore};

use crate::LmdbError;

/// Layout written by this release.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub struct Migrator;

impl Migrator {
    /// Bring `store` up to [`CURRENT_SCHEMA_VERSION`]. Returns the version
    /// that was found.
    pub fn run(store: &impl StateStore) -> Result<u32, LmdbError> {
        let found = stored_version(store)?;
        match found.cmp(&CURRENT_SCHEMA_VERSION) {
            std::cmp::Ordering::Equal => {
                tracing::debug!(version = found, "snapshot schema is up to date");
                return Ok(found);
            }
            std::cmp::Ordering::Greater => {
                return Err(LmdbError::Schema(format!(
                    "snapshots use schema {} but this release reads up to {}",
                    found, CURRENT_SCHEMA_VERSION
                )));
            }
            std::cmp::Ordering::Less => {}
        }

        for from in found..CURRENT_SCHEMA_VERSION {
            step(store, from)?;
            tracing::info!(from, to = from + 1, "snapshot schema migrated");
        }
        store
            .put_state(keys::SCHEMA_VERSION, &CURRENT_SCHEMA_VERSION.to_be_bytes())
            .map_err(|e| LmdbError::Heed(e.to_string()))?;
        Ok(found)
    }
}

fn stored_version(store: &impl StateStore) -> Result<u32, LmdbError> {
    let Some(bytes) = store
        .get_state(keys::SCHEMA_VERSION)
        .map_err(|e| LmdbError::Heed(e.to_string()))?
    else {
        return Ok(0);
    };
    let arr: [u8; 4] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| LmdbError::Schema(format!("schema marker is {} bytes", bytes.len())))?;
    Ok(u32::from_be_bytes(arr))
}

/// Rewrite snapshots from layout `from` to `from + 1`.
fn step(_store: &impl StateStore, from: u32) -> Result<(), LmdbError> {
    match from {
        // Empty database.
        0 => Ok(()),
        _ => Err(LmdbError::Schema(format!("no migration from schema {}", from))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    fn open(dir: &tempfile::TempDir) -> LmdbEnvironment {
        LmdbEnvironment::open(dir.path(), 4, 8 * 1024 * 1024).unwrap()
    }

    #[test]
    fn fresh_database_is_stamped() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).state_store();
        assert_eq!(stored_version(&store).unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(Migrator::run(&store).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).state_store();
        store
            .put_state(keys::SCHEMA_VERSION, &(CURRENT_SCHEMA_VERSION + 1).to_be_bytes())
            .unwrap();
        assert!(matches!(Migrator::run(&store), Err(LmdbError::Schema(_))));
    }

    #[test]
    fn malformed_marker_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).state_store();
        store.put_state(keys::SCHEMA_VERSION, &[1, 2]).unwrap();
        assert!(Migrator::run(&store).is_err());
    }

    #[test]
    fn unknown_step_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).state_store();
        assert!(step(&store, 7).is_err());
    }
}

//! LMDB storage backend for staked governance snapshots.
//!
//! Implements `StateStore` from `stakegov-store` using the `heed` LMDB bindings.
//! All snapshots live in a single named database inside one environment.

pub mod environment;
pub mod error;
pub mod migration;
pub mod state;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use state::LmdbStateStore;

//! Abstract storage traits for staked governance state.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. Components serialize their own snapshots, so the store only ever
//! sees opaque bytes and never depends on the component crates.

pub mod error;
pub mod state;

pub use error::StoreError;
pub use state::{keys, StateStore};

//! Nullable infrastructure for deterministic testing.
//!
//! The clock and snapshot storage are the only things the governance system
//! reaches outside itself for. These stand-ins never touch the filesystem,
//! and time only moves when the test moves it.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStore;

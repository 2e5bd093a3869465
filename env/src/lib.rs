//! Governance-controlled environment variables.
//!
//! A flat, typed key-value store. Only the governance engine may write; reads
//! are unrestricted. Values are kept raw and decoded on demand according to
//! their [`VarType`](stakegov_types::VarType).

pub mod error;
pub mod storage;
pub mod variable;

pub use error::EnvError;
pub use storage::{EnvStorage, EnvironmentStore, VariableChange};
pub use variable::EnvVariable;

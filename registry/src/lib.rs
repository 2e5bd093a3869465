//! Name registry used by every component to find each other.
//!
//! Components never hold direct references to "the governance engine"; they
//! ask the registry on every privileged call who currently holds that role.

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{is_governance, ContractRegistry, Registry};

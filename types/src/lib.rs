//! Fundamental types for the staked governance workspace.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! participant addresses, node endpoints, timestamps, environment variable tags,
//! registry domain names, and the error taxonomy every component reports into.

pub mod address;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod node;
pub mod time;
pub mod var;

pub use address::{Address, AddressParseError};
pub use endpoint::EndpointKey;
pub use error::ErrorKind;
pub use node::Node;
pub use time::Timestamp;
pub use var::VarType;

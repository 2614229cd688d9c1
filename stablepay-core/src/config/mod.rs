//! Configuration types shared by the binaries.
//!
//! These describe what an operator writes in a TOML file. Validation happens
//! when they are turned into runtime types (see
//! [`ChainRegistry::from_entries`](crate::chain_registry::ChainRegistry::from_entries)).

mod chain;

pub use chain::ChainEntry;

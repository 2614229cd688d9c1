//! StablePay SDK.
//!
//! Types shared between the withdrawal core, the ledger service and its
//! clients:
//!
//! - [`objects`]: chains, withdrawal records, transfer state snapshots and
//!   admin API payloads.
//! - [`signature`]: HMAC-SHA256 body signing used by the ledger service API.
//! - `client` (feature `client`): typed HTTP clients for the ledger service.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;

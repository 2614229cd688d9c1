//! StablePay withdrawal core.
//!
//! Moves a user's tokens to the platform custody wallet of the chain they
//! are on and hands the confirmed transfer to the ledger for INR payout.
//! The entry point is [`orchestrator::WithdrawalOrchestrator`]; everything it
//! needs from the user's wallet goes through [`wallet::WalletProvider`].
//!
//! The [`entities`] and [`framework`] modules hold the ledger service's
//! Postgres persistence.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod allowance;
pub mod amount;
pub mod approval;
pub mod chain_registry;
pub mod config;
pub mod consent;
pub mod entities;
pub mod error;
pub mod evm;
pub mod framework;
pub mod ledger;
pub mod orchestrator;
pub mod rates;
pub mod transfer;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, TransferError};
pub use orchestrator::{TransferOutcome, TransferRequest, WithdrawalOrchestrator};

//! Errors of a withdrawal attempt and their classification.

use alloy::primitives::TxHash;
use std::time::Duration;

use crate::amount::AmountError;
use crate::chain_registry::RegistryError;
use crate::wallet::{ConfirmationError, WalletError};

/// Coarse classification of a [`TransferError`], for callers that only need
/// to decide what to show or whether to offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidRequest,
    Read,
    WalletRejected,
    InsufficientFunds,
    Chain,
    Busy,
}

/// Every way a withdrawal attempt can fail.
///
/// The `Display` text is what the orchestrator records as the outcome's
/// error message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("configuration error: {0}")]
    Configuration(#[from] RegistryError),
    #[error("invalid transfer request: {0}")]
    InvalidRequest(String),
    #[error("wallet is connected to chain {connected}, but the transfer targets chain {expected}")]
    WrongNetwork { expected: u64, connected: u64 },
    #[error("connected wallet {connected} is not the transfer owner {owner}")]
    OwnerMismatch { owner: String, connected: String },
    #[error("failed to read {what}: {source}")]
    Read {
        what: &'static str,
        #[source]
        source: WalletError,
    },
    #[error("{action} rejected by user")]
    Rejected { action: &'static str },
    #[error("Insufficient {symbol} balance. Available: {available}, required: {required}")]
    InsufficientFunds {
        symbol: String,
        available: String,
        required: String,
    },
    #[error("{action} failed: balance too low")]
    BalanceRejected { action: &'static str },
    #[error("{action} failed: insufficient funds for gas")]
    InsufficientGas { action: &'static str },
    #[error("{action} failed: {message}")]
    Chain {
        action: &'static str,
        message: String,
    },
    #[error("{action} transaction {hash} was not confirmed within {timeout:?}")]
    ConfirmationTimeout {
        action: &'static str,
        hash: TxHash,
        timeout: Duration,
    },
    #[error("a transfer is already in progress")]
    AlreadyInFlight,
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Configuration(_) => ErrorKind::Configuration,
            TransferError::InvalidRequest(_)
            | TransferError::WrongNetwork { .. }
            | TransferError::OwnerMismatch { .. } => ErrorKind::InvalidRequest,
            TransferError::Read { .. } => ErrorKind::Read,
            TransferError::Rejected { .. } => ErrorKind::WalletRejected,
            TransferError::InsufficientFunds { .. }
            | TransferError::BalanceRejected { .. }
            | TransferError::InsufficientGas { .. } => ErrorKind::InsufficientFunds,
            TransferError::Chain { .. } | TransferError::ConfirmationTimeout { .. } => {
                ErrorKind::Chain
            }
            TransferError::AlreadyInFlight => ErrorKind::Busy,
        }
    }

    /// Whether starting a fresh attempt could succeed without changing
    /// configuration.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::InvalidRequest
        )
    }

    pub(crate) fn read(what: &'static str) -> impl FnOnce(WalletError) -> TransferError {
        move |source| TransferError::Read { what, source }
    }

    /// Error for a failed submission or confirmation of `action`.
    pub(crate) fn submission(action: &'static str, error: WalletError) -> TransferError {
        match error {
            WalletError::Rejected => TransferError::Rejected { action },
            WalletError::InsufficientFunds => TransferError::BalanceRejected { action },
            WalletError::InsufficientGas => TransferError::InsufficientGas { action },
            WalletError::Reverted(hash) => TransferError::Chain {
                action,
                message: format!("transaction {hash} reverted"),
            },
            WalletError::Rpc(message) => TransferError::Chain { action, message },
        }
    }

    pub(crate) fn confirmation(action: &'static str, error: ConfirmationError) -> TransferError {
        match error {
            ConfirmationError::Wallet(e) => TransferError::submission(action, e),
            ConfirmationError::Timeout { hash, timeout } => TransferError::ConfirmationTimeout {
                action,
                hash,
                timeout,
            },
        }
    }

    pub(crate) fn amount(error: AmountError) -> TransferError {
        TransferError::InvalidRequest(error.to_string())
    }
}

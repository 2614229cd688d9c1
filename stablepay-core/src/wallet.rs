//! Wallet capability consumed by the withdrawal flow.
//!
//! The core never holds keys or talks to a node directly. Everything it
//! needs from the connected wallet (identity, token reads, signed
//! submissions and confirmation waits) goes through [`WalletProvider`].

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

/// A transaction that has been included on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedTx {
    /// Hash reported by the receipt. Authoritative over the submitted hash.
    pub hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("request rejected by user")]
    Rejected,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("insufficient funds for gas")]
    InsufficientGas,
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("{0}")]
    Rpc(String),
}

impl WalletError {
    /// Map raw wallet / node error text onto the taxonomy.
    ///
    /// Nodes and signers report these conditions as free-form strings, so
    /// this is a best-effort match on the phrases they actually use.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("rejected by user")
            || lower.contains("action_rejected")
        {
            WalletError::Rejected
        } else if lower.contains("insufficient funds for gas")
            || lower.contains("intrinsic gas too low")
            || lower.contains("out of gas")
            || lower.contains("gas required exceeds allowance")
        {
            WalletError::InsufficientGas
        } else if lower.contains("exceeds balance") || lower.contains("insufficient balance") {
            WalletError::InsufficientFunds
        } else if lower.contains("insufficient funds") {
            // Native sends report a short balance as "insufficient funds for
            // transfer"; the gas case is matched above.
            WalletError::InsufficientFunds
        } else {
            WalletError::Rpc(message)
        }
    }
}

/// Connected wallet plus read access to the chain it is on.
///
/// Submissions return as soon as the wallet has signed and broadcast; use
/// [`wait_for_confirmation`](WalletProvider::wait_for_confirmation) (or
/// [`await_confirmation`]) to wait for inclusion.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn address(&self) -> Address;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError>;

    async fn decimals(&self, token: Address) -> Result<u8, WalletError>;

    async fn symbol(&self, token: Address) -> Result<String, WalletError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, WalletError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, WalletError>;

    async fn send_native(&self, to: Address, value: U256) -> Result<TxHash, WalletError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError>;

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError>;

    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<ConfirmedTx, WalletError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("transaction {hash} was not confirmed within {timeout:?}")]
    Timeout { hash: TxHash, timeout: Duration },
}

/// Wait for `hash` to be included, optionally bounded by `timeout`, and
/// treat a failed receipt as a revert.
///
/// `None` waits for as long as the provider does.
pub async fn await_confirmation(
    wallet: &dyn WalletProvider,
    hash: TxHash,
    timeout: Option<Duration>,
) -> Result<ConfirmedTx, ConfirmationError> {
    let confirmed = match timeout {
        Some(limit) => tokio::time::timeout(limit, wallet.wait_for_confirmation(hash))
            .await
            .map_err(|_| ConfirmationError::Timeout {
                hash,
                timeout: limit,
            })??,
        None => wallet.wait_for_confirmation(hash).await?,
    };
    if !confirmed.success {
        return Err(WalletError::Reverted(confirmed.hash).into());
    }
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wallet_messages() {
        assert_eq!(
            WalletError::classify("MetaMask Tx Signature: User denied transaction signature."),
            WalletError::Rejected
        );
        assert_eq!(
            WalletError::classify("insufficient funds for gas * price + value"),
            WalletError::InsufficientGas
        );
        assert_eq!(
            WalletError::classify("execution reverted: ERC20: transfer amount exceeds balance"),
            WalletError::InsufficientFunds
        );
        assert_eq!(
            WalletError::classify("insufficient funds for transfer"),
            WalletError::InsufficientFunds
        );
        assert_eq!(
            WalletError::classify("connection refused"),
            WalletError::Rpc("connection refused".to_string())
        );
    }
}

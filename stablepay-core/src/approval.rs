//! Approval Requester.
//!
//! Approvals are always for the exact amount being withdrawn. The request is
//! split into [`submit`](ApprovalRequester::submit) (the wallet signs and
//! broadcasts) and [`confirm`](ApprovalRequester::confirm) (wait for
//! inclusion) so callers can tell the two waits apart.

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::amount::to_base_units;
use crate::error::TransferError;
use crate::wallet::{WalletProvider, await_confirmation};

const ACTION: &str = "approval";

/// An approval that has been broadcast but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingApproval {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    pub hash: TxHash,
}

pub struct ApprovalRequester<'a> {
    wallet: &'a dyn WalletProvider,
    confirmation_timeout: Option<Duration>,
}

impl<'a> ApprovalRequester<'a> {
    pub fn new(wallet: &'a dyn WalletProvider, confirmation_timeout: Option<Duration>) -> Self {
        Self {
            wallet,
            confirmation_timeout,
        }
    }

    /// Approve `spender` for exactly `amount` of `token` and wait for the
    /// approval to confirm.
    pub async fn request_approval(
        &self,
        token: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<TxHash, TransferError> {
        let decimals = self
            .wallet
            .decimals(token)
            .await
            .map_err(TransferError::read("token decimals"))?;
        let amount = to_base_units(amount, decimals).map_err(TransferError::amount)?;
        let pending = self.submit(token, spender, amount).await?;
        self.confirm(pending).await
    }

    pub async fn submit(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<PendingApproval, TransferError> {
        let hash = self
            .wallet
            .approve(token, spender, amount)
            .await
            .map_err(|e| {
                warn!(token = %token, error = %e, "approval submission failed");
                TransferError::submission(ACTION, e)
            })?;
        info!(token = %token, spender = %spender, amount = %amount, tx_hash = %hash, "approval submitted");
        Ok(PendingApproval {
            token,
            spender,
            amount,
            hash,
        })
    }

    /// Wait for a submitted approval. Returns the confirmed hash.
    pub async fn confirm(&self, pending: PendingApproval) -> Result<TxHash, TransferError> {
        let confirmed = await_confirmation(self.wallet, pending.hash, self.confirmation_timeout)
            .await
            .map_err(|e| {
                warn!(tx_hash = %pending.hash, error = %e, "approval did not confirm");
                TransferError::confirmation(ACTION, e)
            })?;
        info!(tx_hash = %confirmed.hash, block = ?confirmed.block_number, "approval confirmed");
        Ok(confirmed.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockWallet, USDC, custody, owner};
    use crate::wallet::WalletError;

    #[tokio::test]
    async fn test_approves_exact_amount() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        let requester = ApprovalRequester::new(&wallet, None);

        let hash = requester
            .request_approval(USDC, custody(), Decimal::new(1005, 1))
            .await
            .unwrap();

        let calls = wallet.calls();
        assert!(calls.contains(&Call::Approve {
            spender: custody(),
            amount: U256::from(100_500_000u64),
        }));
        assert_eq!(calls.last(), Some(&Call::Confirm(hash)));
        assert_eq!(wallet.allowance_of(USDC), U256::from(100_500_000u64));
    }

    #[tokio::test]
    async fn test_user_rejection_is_reported_as_such() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        wallet.fail_submissions(WalletError::Rejected);
        let requester = ApprovalRequester::new(&wallet, None);

        let err = requester
            .request_approval(USDC, custody(), Decimal::ONE)
            .await
            .unwrap_err();
        assert_eq!(err, TransferError::Rejected { action: "approval" });
        assert_eq!(err.to_string(), "approval rejected by user");
    }

    #[tokio::test]
    async fn test_gas_and_revert_failures() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        wallet.fail_submissions(WalletError::InsufficientGas);
        let requester = ApprovalRequester::new(&wallet, None);
        let err = requester
            .submit(USDC, custody(), U256::from(1u64))
            .await
            .unwrap_err();
        assert_eq!(err, TransferError::InsufficientGas { action: "approval" });

        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        wallet.revert_transactions();
        let requester = ApprovalRequester::new(&wallet, None);
        let err = requester
            .request_approval(USDC, custody(), Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Chain { action: "approval", .. }));
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        wallet.hang_confirmations();
        let requester = ApprovalRequester::new(&wallet, Some(Duration::from_millis(20)));

        let pending = requester
            .submit(USDC, custody(), U256::from(1u64))
            .await
            .unwrap();
        let err = requester.confirm(pending).await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::ConfirmationTimeout { action: "approval", hash, .. } if hash == pending.hash
        ));
    }
}

//! Transfer Executor: moves the withdrawal amount to the custody wallet.

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::amount::{NATIVE_DECIMALS, to_base_units};
use crate::chain_registry::ChainProfile;
use crate::error::TransferError;
use crate::wallet::{WalletProvider, await_confirmation};

const ACTION: &str = "transfer";

pub struct TransferExecutor<'a> {
    wallet: &'a dyn WalletProvider,
    confirmation_timeout: Option<Duration>,
}

impl<'a> TransferExecutor<'a> {
    pub fn new(wallet: &'a dyn WalletProvider, confirmation_timeout: Option<Duration>) -> Self {
        Self {
            wallet,
            confirmation_timeout,
        }
    }

    /// Send `amount` of `token` (or the native asset) to `destination` and
    /// wait for confirmation.
    pub async fn execute_transfer(
        &self,
        profile: &ChainProfile,
        token: Address,
        amount: Decimal,
        destination: Address,
    ) -> Result<TxHash, TransferError> {
        let decimals = if profile.is_native(token) {
            NATIVE_DECIMALS
        } else {
            self.wallet
                .decimals(token)
                .await
                .map_err(TransferError::read("token decimals"))?
        };
        let units = to_base_units(amount, decimals).map_err(TransferError::amount)?;
        self.execute_units(profile, token, units, destination).await
    }

    /// Same as [`execute_transfer`](Self::execute_transfer) with the amount
    /// already in base units.
    ///
    /// Returns the hash from the receipt, which is authoritative when it
    /// differs from the submitted one.
    pub async fn execute_units(
        &self,
        profile: &ChainProfile,
        token: Address,
        amount: U256,
        destination: Address,
    ) -> Result<TxHash, TransferError> {
        let submitted = if profile.is_native(token) {
            self.wallet.send_native(destination, amount).await
        } else {
            self.wallet.transfer(token, destination, amount).await
        }
        .map_err(|e| {
            warn!(chain_id = profile.chain_id, token = %token, error = %e, "transfer submission failed");
            TransferError::submission(ACTION, e)
        })?;
        info!(
            chain_id = profile.chain_id,
            token = %token,
            amount = %amount,
            tx_hash = %submitted,
            "transfer submitted"
        );

        let confirmed = await_confirmation(self.wallet, submitted, self.confirmation_timeout)
            .await
            .map_err(|e| {
                warn!(tx_hash = %submitted, error = %e, "transfer did not confirm");
                TransferError::confirmation(ACTION, e)
            })?;
        if confirmed.hash != submitted {
            info!(submitted = %submitted, confirmed = %confirmed.hash, "transfer replaced before inclusion");
        }
        Ok(confirmed.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_registry::NATIVE_SENTINEL;
    use crate::testing::{Call, MockWallet, USDC, custody, owner, polygon_profile};
    use crate::wallet::WalletError;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_native_uses_eighteen_decimals() {
        let wallet = MockWallet::new(137, owner());
        let executor = TransferExecutor::new(&wallet, None);
        executor
            .execute_transfer(
                &polygon_profile(),
                NATIVE_SENTINEL,
                Decimal::from_str("0.5").unwrap(),
                custody(),
            )
            .await
            .unwrap();

        assert!(wallet.calls().contains(&Call::SendNative {
            to: custody(),
            value: U256::from(500_000_000_000_000_000u64),
        }));
    }

    #[tokio::test]
    async fn test_token_uses_contract_decimals() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        let executor = TransferExecutor::new(&wallet, None);
        executor
            .execute_transfer(&polygon_profile(), USDC, Decimal::from(100), custody())
            .await
            .unwrap();

        let calls = wallet.calls();
        assert_eq!(calls[0], Call::Decimals);
        assert_eq!(
            calls[1],
            Call::Transfer {
                to: custody(),
                amount: U256::from(100_000_000u64),
            }
        );
    }

    #[tokio::test]
    async fn test_confirmed_hash_is_authoritative() {
        let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
        wallet.rehash_on_confirm();
        let executor = TransferExecutor::new(&wallet, None);
        let hash = executor
            .execute_units(&polygon_profile(), USDC, U256::from(1u64), custody())
            .await
            .unwrap();

        let submitted = wallet
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Confirm(h) => Some(h),
                _ => None,
            })
            .unwrap();
        assert_ne!(hash, submitted);
    }

    #[tokio::test]
    async fn test_failure_taxonomy() {
        let cases = [
            (WalletError::Rejected, "transfer rejected by user"),
            (WalletError::InsufficientFunds, "transfer failed: balance too low"),
            (
                WalletError::InsufficientGas,
                "transfer failed: insufficient funds for gas",
            ),
            (
                WalletError::Rpc("connection reset".to_string()),
                "transfer failed: connection reset",
            ),
        ];
        for (wallet_error, message) in cases {
            let wallet = MockWallet::new(137, owner()).with_token(USDC, "USDC", 6);
            wallet.fail_submissions(wallet_error);
            let executor = TransferExecutor::new(&wallet, None);
            let err = executor
                .execute_units(&polygon_profile(), USDC, U256::from(1u64), custody())
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[tokio::test]
    async fn test_reverted_transfer_is_chain_error() {
        let wallet = MockWallet::new(137, owner());
        wallet.fail_confirmations(WalletError::Rpc("receipt unavailable".to_string()));
        let executor = TransferExecutor::new(&wallet, None);
        let err = executor
            .execute_units(&polygon_profile(), NATIVE_SENTINEL, U256::from(1u64), custody())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transfer failed: receipt unavailable");

        let wallet = MockWallet::new(137, owner());
        wallet.revert_transactions();
        let executor = TransferExecutor::new(&wallet, None);
        let err = executor
            .execute_units(&polygon_profile(), NATIVE_SENTINEL, U256::from(1u64), custody())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("reverted"));
    }
}

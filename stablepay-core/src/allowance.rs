//! Allowance Checker: does the custody wallet need an approval before the
//! token can be moved?

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::debug;

use crate::amount::{format_base_units, to_base_units};
use crate::chain_registry::ChainProfile;
use crate::error::TransferError;
use crate::wallet::WalletProvider;

/// Result of an allowance check. Recomputed for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceStatus {
    pub needs_approval: bool,
    /// Current allowance in token units, as a decimal string.
    pub current_allowance: String,
}

pub struct AllowanceChecker<'a> {
    wallet: &'a dyn WalletProvider,
}

impl<'a> AllowanceChecker<'a> {
    pub fn new(wallet: &'a dyn WalletProvider) -> Self {
        Self { wallet }
    }

    /// Check whether `spender` may already move `required` of `token` on
    /// behalf of `owner`.
    ///
    /// The native sentinel never needs approval and causes no chain read.
    pub async fn check(
        &self,
        profile: &ChainProfile,
        token: Address,
        owner: Address,
        spender: Address,
        required: Decimal,
    ) -> Result<AllowanceStatus, TransferError> {
        if profile.is_native(token) {
            return Ok(AllowanceStatus {
                needs_approval: false,
                current_allowance: required.normalize().to_string(),
            });
        }
        let decimals = self
            .wallet
            .decimals(token)
            .await
            .map_err(TransferError::read("token decimals"))?;
        let required = to_base_units(required, decimals).map_err(TransferError::amount)?;
        self.check_units(token, owner, spender, required, decimals)
            .await
    }

    /// Same as [`check`](Self::check) for a token whose decimals are already
    /// known, with the amount in base units.
    pub async fn check_units(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        required: U256,
        decimals: u8,
    ) -> Result<AllowanceStatus, TransferError> {
        let allowance = self
            .wallet
            .allowance(token, owner, spender)
            .await
            .map_err(TransferError::read("token allowance"))?;
        let needs_approval = allowance < required;
        debug!(
            token = %token,
            spender = %spender,
            allowance = %allowance,
            required = %required,
            needs_approval,
            "allowance checked"
        );
        Ok(AllowanceStatus {
            needs_approval,
            current_allowance: format_base_units(allowance, decimals),
        })
    }
}

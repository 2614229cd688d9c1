//! Hand-off of confirmed withdrawals to the ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use stablepay_sdk::client::{ClientError, LedgerClient};
use stablepay_sdk::objects::{BankDetails, InitiateWithdrawal, ValidationError, WithdrawalResponse};

use crate::rates::{FiatRateSource, RateError};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("INR rate unavailable: {0}")]
    Rate(#[from] RateError),
    #[error("withdrawal record rejected before sending: {0}")]
    Invalid(#[from] ValidationError),
    #[error("ledger request failed: {0}")]
    Client(#[from] ClientError),
}

/// The ledger's "initiate withdrawal" write.
#[async_trait]
pub trait WithdrawalLedger: Send + Sync {
    async fn initiate_withdrawal(
        &self,
        request: InitiateWithdrawal,
    ) -> Result<WithdrawalResponse, LedgerError>;
}

#[async_trait]
impl WithdrawalLedger for LedgerClient {
    async fn initiate_withdrawal(
        &self,
        request: InitiateWithdrawal,
    ) -> Result<WithdrawalResponse, LedgerError> {
        request.validate()?;
        Ok(LedgerClient::initiate_withdrawal(self, request).await?)
    }
}

/// Everything the orchestrator needs to record a completed transfer.
#[derive(Clone)]
pub struct Settlement {
    pub ledger: Arc<dyn WithdrawalLedger>,
    pub rates: Arc<dyn FiatRateSource>,
    pub bank_details: BankDetails,
}

impl Settlement {
    pub fn new(
        ledger: Arc<dyn WithdrawalLedger>,
        rates: Arc<dyn FiatRateSource>,
        bank_details: BankDetails,
    ) -> Self {
        Self {
            ledger,
            rates,
            bank_details,
        }
    }
}

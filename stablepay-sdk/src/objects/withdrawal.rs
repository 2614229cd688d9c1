//! Withdrawal hand-off types.
//!
//! [`InitiateWithdrawal`] is what the withdrawal core posts to the ledger
//! service once a transfer to the custody wallet has confirmed. The ledger
//! answers with a [`WithdrawalResponse`] and owns the record's INR
//! settlement lifecycle from then on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::Signature;

/// Bank account the INR payout is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub account_number: String,
    /// Indian Financial System Code of the receiving branch.
    pub ifsc: String,
}

impl BankDetails {
    /// Account number with all but the last four digits masked.
    pub fn masked_account_number(&self) -> String {
        let len = self.account_number.chars().count();
        let visible = len.saturating_sub(4);
        self.account_number
            .chars()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { c })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let holder = self.account_holder.trim();
        if holder.is_empty() || holder.chars().count() > 100 {
            return Err(ValidationError::AccountHolder);
        }
        let number_ok = (9..=18).contains(&self.account_number.len())
            && self.account_number.bytes().all(|b| b.is_ascii_digit());
        if !number_ok {
            return Err(ValidationError::AccountNumber);
        }
        if !is_valid_ifsc(&self.ifsc) {
            return Err(ValidationError::Ifsc(self.ifsc.clone()));
        }
        Ok(())
    }
}

/// Request payload for recording a withdrawal after the on-chain transfer
/// to custody has confirmed.
///
/// Sent by the withdrawal core to the ledger Service API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InitiateWithdrawal {
    pub user_address: String,
    pub token_symbol: String,
    pub token_amount: Decimal,
    pub chain_id: u64,
    pub transfer_hash: String,
    pub inr_amount: Decimal,
    pub bank_details: BankDetails,
}

impl Signature for InitiateWithdrawal {}

impl InitiateWithdrawal {
    /// Shape checks shared by the client and the ledger service.
    ///
    /// Whether `chain_id` is accepted is a ledger configuration concern and
    /// is not checked here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_hex_string(&self.user_address, 40) {
            return Err(ValidationError::UserAddress(self.user_address.clone()));
        }
        let symbol_ok = !self.token_symbol.is_empty()
            && self.token_symbol.len() <= 16
            && self
                .token_symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !symbol_ok {
            return Err(ValidationError::TokenSymbol(self.token_symbol.clone()));
        }
        if self.token_amount <= Decimal::ZERO {
            return Err(ValidationError::TokenAmount);
        }
        if self.inr_amount <= Decimal::ZERO {
            return Err(ValidationError::InrAmount);
        }
        if !is_hex_string(&self.transfer_hash, 64) {
            return Err(ValidationError::TransferHash(self.transfer_hash.clone()));
        }
        self.bank_details.validate()
    }
}

/// Request payload for looking up a withdrawal by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetWithdrawalRequest {
    pub withdrawal_id: Uuid,
}

impl Signature for GetWithdrawalRequest {}

/// Response returned by both the "initiate withdrawal" and "get withdrawal"
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalResponse {
    pub withdrawal_id: Uuid,
    pub user_address: String,
    pub token_symbol: String,
    pub token_amount: Decimal,
    pub chain_id: u64,
    pub transfer_hash: String,
    pub inr_amount: Decimal,
    pub status: WithdrawalStatus,
    /// Unix timestamp of when the record was created.
    pub created_at: i64,
}

/// INR settlement status of a withdrawal record.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `stablepay-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WithdrawalStatus::Completed | WithdrawalStatus::Failed)
    }

    /// Settlement moves forward only: `pending -> processing -> completed`,
    /// and either non-terminal state may fail.
    pub fn can_transition_to(self, next: WithdrawalStatus) -> bool {
        matches!(
            (self, next),
            (WithdrawalStatus::Pending, WithdrawalStatus::Processing)
                | (WithdrawalStatus::Pending, WithdrawalStatus::Failed)
                | (WithdrawalStatus::Processing, WithdrawalStatus::Completed)
                | (WithdrawalStatus::Processing, WithdrawalStatus::Failed)
        )
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalStatus::Pending => write!(f, "pending"),
            WithdrawalStatus::Processing => write!(f, "processing"),
            WithdrawalStatus::Completed => write!(f, "completed"),
            WithdrawalStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "processing" => Ok(WithdrawalStatus::Processing),
            "completed" => Ok(WithdrawalStatus::Completed),
            "failed" => Ok(WithdrawalStatus::Failed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown withdrawal status: {0}")]
pub struct UnknownStatus(pub String);

/// Why an [`InitiateWithdrawal`] was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid user address: {0}")]
    UserAddress(String),
    #[error("invalid token symbol: {0}")]
    TokenSymbol(String),
    #[error("token amount must be positive")]
    TokenAmount,
    #[error("INR amount must be positive")]
    InrAmount,
    #[error("invalid transfer hash: {0}")]
    TransferHash(String),
    #[error("chain {0} is not accepted by this ledger")]
    UnsupportedChain(u64),
    #[error("account holder name must be 1-100 characters")]
    AccountHolder,
    #[error("account number must be 9-18 digits")]
    AccountNumber,
    #[error("invalid IFSC code: {0}")]
    Ifsc(String),
}

fn is_hex_string(value: &str, hex_len: usize) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == hex_len && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `AAAA0XXXXXX`: four bank letters, a literal zero, six branch characters.
fn is_valid_ifsc(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(|b| b.is_ascii_uppercase())
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

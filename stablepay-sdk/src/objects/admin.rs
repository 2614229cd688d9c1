//! Admin API request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::withdrawal::WithdrawalStatus;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Full withdrawal detail for the admin API, bank details included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminWithdrawalResponse {
    pub withdrawal_id: Uuid,
    pub user_address: String,
    pub token_symbol: String,
    pub token_amount: Decimal,
    pub chain_id: u64,
    pub transfer_hash: String,
    pub inr_amount: Decimal,
    pub bank_account_holder: String,
    pub bank_account_number: String,
    pub bank_ifsc: String,
    pub status: WithdrawalStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/admin/withdrawals/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWithdrawalStatusRequest {
    pub status: WithdrawalStatus,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Query parameters for listing withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWithdrawalsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WithdrawalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_address: Option<String>,
}

impl Default for ListWithdrawalsQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            status: None,
            chain_id: None,
            user_address: None,
        }
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pagination() {
        assert_eq!(clamp_pagination(0, -5), (1, 0));
        assert_eq!(clamp_pagination(5_000, 10), (MAX_LIMIT, 10));
        assert_eq!(clamp_pagination(50, 1_000_000), (50, MAX_OFFSET));
    }

    #[test]
    fn test_query_defaults() {
        let query: ListWithdrawalsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, ListWithdrawalsQuery::default());
    }
}

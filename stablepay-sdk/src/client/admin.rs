//! Admin API client (operator tooling → ledger service).
//!
//! All requests carry the plaintext admin secret in the
//! `StablePay-Admin-Authorization` header.

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::admin::{
    AdminWithdrawalResponse, ListWithdrawalsQuery, UpdateWithdrawalStatusRequest,
};
use crate::objects::withdrawal::WithdrawalStatus;
use crate::signature::ADMIN_AUTH_HEADER;

/// Typed HTTP client for the ledger **Admin API**.
///
/// The secret is verified server-side against an argon2-hashed value.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    admin_secret: String,
}

impl AdminClient {
    pub fn new(base_url: Url, admin_secret: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            admin_secret: admin_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/admin/withdrawals` – list withdrawals, newest first.
    pub async fn list_withdrawals(
        &self,
        query: &ListWithdrawalsQuery,
    ) -> Result<Vec<AdminWithdrawalResponse>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/withdrawals")?;

        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(query)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /api/v1/admin/withdrawals/{id}/status` – move a withdrawal
    /// along its settlement lifecycle.
    ///
    /// The server answers `409 Conflict` for transitions that are not
    /// allowed from the current status.
    pub async fn update_withdrawal_status(
        &self,
        withdrawal_id: Uuid,
        status: WithdrawalStatus,
    ) -> Result<AdminWithdrawalResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/withdrawals/{withdrawal_id}/status"))?;

        let resp = self
            .http
            .post(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .json(&UpdateWithdrawalStatusRequest { status })
            .send()
            .await?;

        parse_response(resp).await
    }
}

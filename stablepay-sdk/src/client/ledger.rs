//! Service API client (withdrawal core → ledger service).
//!
//! All requests use body-signed HMAC-SHA256 authentication via
//! [`SignedObject`].

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::withdrawal::{GetWithdrawalRequest, InitiateWithdrawal, WithdrawalResponse};
use crate::signature::{SIGNATURE_HEADER, Signature, SignedObject};

/// Typed HTTP client for the ledger **Service API**.
///
/// Every request body is signed with
/// `HMAC-SHA256("{timestamp}.{json}", client_secret)`.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl LedgerClient {
    /// * `base_url` – root URL of the ledger service.
    /// * `client_secret` – the shared HMAC secret for body signing.
    pub fn new(base_url: Url, client_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: client_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/v1/service/withdrawals` – record a withdrawal whose
    /// custody transfer has confirmed.
    ///
    /// Repeating the call for the same `(chain_id, transfer_hash)` returns
    /// the existing record.
    pub async fn initiate_withdrawal(
        &self,
        payload: InitiateWithdrawal,
    ) -> Result<WithdrawalResponse, ClientError> {
        self.post_signed("/api/v1/service/withdrawals", payload)
            .await
    }

    /// `POST /api/v1/service/withdrawals/status` – fetch a recorded
    /// withdrawal.
    pub async fn get_withdrawal(
        &self,
        withdrawal_id: Uuid,
    ) -> Result<WithdrawalResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/withdrawals/status",
            GetWithdrawalRequest { withdrawal_id },
        )
        .await
    }

    async fn post_signed<B: Signature>(
        &self,
        path: &str,
        body: B,
    ) -> Result<WithdrawalResponse, ClientError> {
        let signed = SignedObject::new(body, &self.secret).map_err(ClientError::Json)?;
        let url = self.base_url.join(path)?;

        let resp = self
            .http
            .post(url)
            .header(SIGNATURE_HEADER, signed.to_header())
            .body(signed.json)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        parse_response(resp).await
    }
}

//! Service API handlers.
//!
//! These endpoints are called by the withdrawal core once a custody transfer
//! has confirmed, and require a signed body verified via the
//! `StablePay-Signature` header.
//!
//! # Endpoints
//!
//! - `POST /withdrawals`        – record a confirmed withdrawal
//! - `POST /withdrawals/status` – get the status of an existing withdrawal

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use kanau::processor::Processor;
use stablepay_core::entities::withdrawal_record::{
    GetWithdrawalRecordById, InsertWithdrawalRecord, WithdrawalRecordInsert,
};
use stablepay_sdk::objects::{
    GetWithdrawalRequest, InitiateWithdrawal, ValidationError, WithdrawalResponse,
};

use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// Build the Service API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/withdrawals", post(initiate_withdrawal))
        .route("/withdrawals/status", post(get_withdrawal_status))
}

/// `POST /withdrawals`: record a withdrawal in `pending` status.
///
/// Idempotent on `(chain_id, transfer_hash)`: a repeated hand-off answers
/// `200` with the existing record instead of `201`.
async fn initiate_withdrawal(
    State(state): State<AppState>,
    SignedBody(payload): SignedBody<InitiateWithdrawal>,
) -> Result<impl IntoResponse, ServiceApiError> {
    payload.validate().map_err(ServiceApiError::Invalid)?;
    if !state.config().await.supports_chain(payload.chain_id) {
        return Err(ServiceApiError::Invalid(ValidationError::UnsupportedChain(
            payload.chain_id,
        )));
    }

    let chain_id = payload.chain_id;
    let inserted = state
        .db
        .process(InsertWithdrawalRecord {
            insert: WithdrawalRecordInsert::from(payload),
        })
        .await
        .map_err(ServiceApiError::Database)?;

    let status = if inserted.created {
        tracing::info!(
            withdrawal_id = %inserted.record.id,
            chain_id,
            tx_hash = %inserted.record.transfer_hash,
            "Withdrawal recorded"
        );
        StatusCode::CREATED
    } else {
        tracing::info!(
            withdrawal_id = %inserted.record.id,
            chain_id,
            tx_hash = %inserted.record.transfer_hash,
            "Withdrawal already recorded for this transfer"
        );
        StatusCode::OK
    };
    Ok((status, Json(WithdrawalResponse::from(inserted.record))))
}

/// `POST /withdrawals/status`: get the status of an existing withdrawal.
async fn get_withdrawal_status(
    State(state): State<AppState>,
    SignedBody(payload): SignedBody<GetWithdrawalRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let record = state
        .db
        .process(GetWithdrawalRecordById {
            id: payload.withdrawal_id,
        })
        .await
        .map_err(ServiceApiError::Database)?
        .ok_or(ServiceApiError::NotFound)?;

    Ok(Json(WithdrawalResponse::from(record)))
}

/// Errors that can occur in Service API handlers.
#[derive(Debug)]
enum ServiceApiError {
    Invalid(ValidationError),
    Database(sqlx::Error),
    NotFound,
}

impl IntoResponse for ServiceApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServiceApiError::Invalid(e) => {
                tracing::debug!(error = %e, "Rejected withdrawal request");
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
            }
            ServiceApiError::Database(e) => {
                tracing::error!(error = %e, "Service API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ServiceApiError::NotFound => {
                (StatusCode::NOT_FOUND, "withdrawal not found").into_response()
            }
        }
    }
}

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use stablepay_core::entities::withdrawal_record::{StatusUpdate, UpdateWithdrawalStatus};
use stablepay_sdk::objects::WithdrawalStatus;
use stablepay_sdk::objects::admin::{AdminWithdrawalResponse, UpdateWithdrawalStatusRequest};
use uuid::Uuid;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /withdrawals/{withdrawal_id}/status`: advance the settlement
/// lifecycle. Transitions not allowed from the current status answer `409`.
pub async fn update_status(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(withdrawal_id): Path<Uuid>,
    Json(body): Json<UpdateWithdrawalStatusRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let outcome = state
        .db
        .process(UpdateWithdrawalStatus {
            id: withdrawal_id,
            status: body.status.into(),
        })
        .await
        .map_err(AdminApiError::Database)?;

    match outcome {
        StatusUpdate::Updated(record) => {
            tracing::info!(
                %withdrawal_id,
                status = %body.status,
                "Withdrawal status updated"
            );
            Ok(Json(AdminWithdrawalResponse::from(record)))
        }
        StatusUpdate::NotFound => Err(AdminApiError::NotFound),
        StatusUpdate::InvalidTransition { current } => {
            let current = WithdrawalStatus::from(current);
            Err(AdminApiError::Conflict(format!(
                "cannot move withdrawal from {current} to {}",
                body.status
            )))
        }
    }
}

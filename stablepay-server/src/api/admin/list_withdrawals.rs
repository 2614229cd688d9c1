use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use stablepay_core::entities::withdrawal_record::ListWithdrawalRecords;
use stablepay_sdk::objects::admin::{
    AdminWithdrawalResponse, ListWithdrawalsQuery, clamp_pagination,
};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `GET /withdrawals`: list withdrawals, newest first, with optional filters.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListWithdrawalsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let records = state
        .db
        .process(ListWithdrawalRecords {
            limit,
            offset,
            status: query.status.map(Into::into),
            chain_id: query.chain_id.and_then(|id| i64::try_from(id).ok()),
            user_address: query.user_address,
        })
        .await
        .map_err(AdminApiError::Database)?;

    let response: Vec<AdminWithdrawalResponse> = records.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

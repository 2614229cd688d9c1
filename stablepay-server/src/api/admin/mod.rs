//! Admin API handlers.
//!
//! Used by operators settling INR payouts. Every request needs the
//! `StablePay-Admin-Authorization` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET  /withdrawals`                      – list withdrawals (paginated, filterable)
//! - `POST /withdrawals/{withdrawal_id}/status` – move a withdrawal to a new status

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::state::AppState;

mod list_withdrawals;
mod update_status;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/withdrawals", get(list_withdrawals::list_withdrawals))
        .route(
            "/withdrawals/{withdrawal_id}/status",
            post(update_status::update_status),
        )
}

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Database(sqlx::Error),
    NotFound,
    Conflict(String),
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound => {
                (StatusCode::NOT_FOUND, "withdrawal not found").into_response()
            }
            AdminApiError::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
        }
    }
}

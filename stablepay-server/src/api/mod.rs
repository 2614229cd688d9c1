//! HTTP API of the ledger service.
//!
//! - `/api/v1/service/*`: called by the withdrawal core, HMAC-signed bodies.
//! - `/api/v1/admin/*`: operator endpoints, admin secret header.

pub mod admin;
pub mod extractors;
pub mod service;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/service", service::router())
        .nest("/api/v1/admin", admin::router())
}

//! Axum server setup and router configuration.

use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::router())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{AdminConfig, ClientConfig, RuntimeConfig, ServerConfig};
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;
    use stablepay_sdk::objects::{BankDetails, InitiateWithdrawal};
    use stablepay_sdk::signature::{ADMIN_AUTH_HEADER, SIGNATURE_HEADER, SignedObject};
    use tower::ServiceExt;

    const CLIENT_SECRET: &[u8] = b"0123456789abcdef0123";

    /// Router over a pool that never connects; only paths that stop before
    /// the database are exercised.
    fn router() -> Router {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"admin-secret", &salt)
            .unwrap()
            .to_string();
        let config = RuntimeConfig {
            server: ServerConfig {
                listen: "127.0.0.1:0".parse().unwrap(),
            },
            admin: AdminConfig::new(hash),
            client: ClientConfig::new(CLIENT_SECRET.to_vec()),
            chains: [1, 137].into_iter().collect(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://stablepay@localhost/stablepay")
            .unwrap();
        build_router(AppState::new(pool, config))
    }

    fn withdrawal() -> InitiateWithdrawal {
        InitiateWithdrawal {
            user_address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
            token_symbol: "USDC".to_string(),
            token_amount: Decimal::from(100),
            chain_id: 137,
            transfer_hash: format!("0x{}", "ab".repeat(32)),
            inr_amount: Decimal::from(8325),
            bank_details: BankDetails {
                account_holder: "Asha Verma".to_string(),
                account_number: "123456789012".to_string(),
                ifsc: "HDFC0001234".to_string(),
            },
        }
    }

    fn signed_post(body: InitiateWithdrawal, key: &[u8]) -> Request<Body> {
        let signed = SignedObject::new(body, key).unwrap();
        Request::post("/api/v1/service/withdrawals")
            .header(SIGNATURE_HEADER, signed.to_header())
            .header("content-type", "application/json")
            .body(Body::from(signed.json))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("healthy"));
    }

    #[tokio::test]
    async fn test_unsigned_withdrawal_is_unauthorized() {
        let request = Request::post("/api/v1/service/withdrawals")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&withdrawal()).unwrap()))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_is_unauthorized() {
        let response = router()
            .oneshot(signed_post(withdrawal(), b"some-other-secret-value"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_withdrawal_is_unprocessable() {
        let mut body = withdrawal();
        body.transfer_hash = "0x1234".to_string();
        let response = router()
            .oneshot(signed_post(body, CLIENT_SECRET))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unsupported_chain_is_unprocessable() {
        let mut body = withdrawal();
        body.chain_id = 8453;
        let response = router()
            .oneshot(signed_post(body, CLIENT_SECRET))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("8453"));
    }

    #[tokio::test]
    async fn test_admin_requires_secret() {
        let missing = router()
            .oneshot(
                Request::get("/api/v1/admin/withdrawals")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = router()
            .oneshot(
                Request::get("/api/v1/admin/withdrawals")
                    .header(ADMIN_AUTH_HEADER, "guess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }
}

//! Challenge issuance endpoint.

use crate::api::handlers::auth::message::generate_payload;
use crate::api::handlers::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::auth::utils::{extract_client_ip, valid_wallet_address, wallet_storage_key};
use alloy_primitives::Address;
use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::types::{LoginPayload, PayloadRequest};

/// Issue a login challenge for a wallet address.
#[utoipa::path(
    post,
    path = "/v1/auth/ethereum/payload",
    request_body = PayloadRequest,
    responses(
        (status = 200, description = "Login challenge to sign", body = LoginPayload),
        (status = 400, description = "Missing or malformed request"),
        (status = 429, description = "Rate limited"),
    ),
    tag = "auth"
)]
pub async fn payload(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    request: Option<Json<PayloadRequest>>,
) -> Response {
    let Some(Json(request)) = request else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter
        .check_ip(client_ip.as_deref(), RateLimitAction::Payload)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited").into_response();
    }

    if !valid_wallet_address(&request.address) {
        return (StatusCode::BAD_REQUEST, "Invalid wallet address").into_response();
    }
    let Ok(address) = request.address.trim().parse::<Address>() else {
        return (StatusCode::BAD_REQUEST, "Invalid wallet address").into_response();
    };

    // Rate limit on the canonical key so casing does not split the bucket.
    if state
        .rate_limiter
        .check_wallet(&wallet_storage_key(&address), RateLimitAction::Payload)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited").into_response();
    }

    let chain_id = match request.chain_id.as_deref() {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(id) => id,
            Err(_) => return (StatusCode::BAD_REQUEST, "Invalid chain id").into_response(),
        },
        None => state.config.chain_id(),
    };

    debug!(address = %address, chain_id, "issuing login challenge");
    let payload = generate_payload(&address, chain_id, &state.config, Utc::now());
    (StatusCode::OK, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::rate_limit::NoopRateLimiter;
    use crate::api::handlers::auth::state::AuthConfig;
    use anyhow::Result;
    use axum::body::to_bytes;

    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("chat.example.com", "https://chat.example.com", 1);
        Arc::new(AuthState::new(config, Arc::new(NoopRateLimiter)))
    }

    #[tokio::test]
    async fn payload_missing_body() {
        let response = payload(Extension(auth_state()), HeaderMap::new(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payload_rejects_malformed_address() {
        let request = PayloadRequest {
            address: "not-an-address".to_string(),
            chain_id: None,
        };
        let response = payload(Extension(auth_state()), HeaderMap::new(), Some(Json(request))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payload_rejects_bad_chain_id() {
        let request = PayloadRequest {
            address: TEST_ADDRESS.to_string(),
            chain_id: Some("mainnet".to_string()),
        };
        let response = payload(Extension(auth_state()), HeaderMap::new(), Some(Json(request))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payload_returns_challenge() -> Result<()> {
        let request = PayloadRequest {
            address: TEST_ADDRESS.to_string(),
            chain_id: None,
        };
        let response = payload(Extension(auth_state()), HeaderMap::new(), Some(Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let challenge: LoginPayload = serde_json::from_slice(&body)?;
        assert_eq!(challenge.domain, "chat.example.com");
        assert_eq!(challenge.address, TEST_ADDRESS);
        assert_eq!(challenge.chain_id, "1");
        Ok(())
    }

    #[tokio::test]
    async fn payload_applies_chain_id_override() -> Result<()> {
        let request = PayloadRequest {
            address: TEST_ADDRESS.to_string(),
            chain_id: Some("8453".to_string()),
        };
        let response = payload(Extension(auth_state()), HeaderMap::new(), Some(Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let challenge: LoginPayload = serde_json::from_slice(&body)?;
        assert_eq!(challenge.chain_id, "8453");
        Ok(())
    }
}

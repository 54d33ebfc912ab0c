//! Signed-message login endpoint.

use crate::api::handlers::auth::ethereum::{handle_ethereum_login, EthereumLoginError};
use crate::api::handlers::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::api::handlers::auth::session::build_session_cookie;
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::auth::storage::{insert_session, PgUserDirectory, SessionMetadata};
use crate::api::handlers::auth::utils::extract_client_ip;
use axum::extract::Extension;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error};

use super::types::{EthereumLoginRequest, LoginResponse, USER_TYPE_ETHEREUM};

/// Log in with a signed challenge.
///
/// A rejected attempt always answers 401 with a generic body; the reason is
/// only logged server side.
#[utoipa::path(
    post,
    path = "/v1/auth/ethereum/login",
    request_body = EthereumLoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Login rejected"),
        (status = 429, description = "Rate limited"),
        (status = 500, description = "Internal error"),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    headers: HeaderMap,
    request: Option<Json<EthereumLoginRequest>>,
) -> Response {
    let Some(Json(request)) = request else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter
        .check_ip(client_ip.as_deref(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited").into_response();
    }
    // The address is unvalidated here; lowercase it so casing does not split
    // the rate limit bucket.
    if state
        .rate_limiter
        .check_wallet(&request.address.trim().to_lowercase(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited").into_response();
    }

    let directory = PgUserDirectory::new(pool.clone());
    let outcome =
        match handle_ethereum_login(&directory, &state.config, &request, Utc::now()).await {
            Ok(outcome) => outcome,
            Err(EthereumLoginError::Directory(err)) => {
                error!("login failed: {err:#}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
            }
            Err(err) => {
                debug!(address = %request.address, "login rejected: {err}");
                return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
            }
        };

    let metadata = SessionMetadata {
        ip_address: client_ip.as_deref().and_then(|ip| ip.parse().ok()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };

    let token = match insert_session(
        &pool,
        outcome.user.id,
        state.config.session_ttl_seconds(),
        &metadata,
    )
    .await
    {
        Ok(token) => token,
        Err(err) => {
            error!("failed to create session: {err:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    let body = LoginResponse {
        user_id: outcome.user.id,
        email: outcome.user.email.clone(),
        wallet_address: outcome.user.wallet_address.clone(),
        user_type: USER_TYPE_ETHEREUM.to_string(),
        is_new_user: outcome.is_new_user,
    };

    let cookie = build_session_cookie(
        &token,
        state.config.session_ttl_seconds(),
        state.config.session_cookie_secure(),
    );

    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    // Bearer copy of the token for non-browser clients.
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
        response.headers_mut().insert(header::AUTHORIZATION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::message::generate_payload;
    use crate::api::handlers::auth::rate_limit::NoopRateLimiter;
    use crate::api::handlers::auth::state::AuthConfig;
    use alloy_primitives::hex;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("chat.example.com", "https://chat.example.com", 1);
        Arc::new(AuthState::new(config, Arc::new(NoopRateLimiter)))
    }

    #[tokio::test]
    async fn login_missing_body() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(Extension(auth_state()), Extension(pool), HeaderMap::new(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn login_blank_credentials_rejected() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = EthereumLoginRequest {
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            signature: "   ".to_string(),
            message: "{}".to_string(),
        };
        let response = login(
            Extension(auth_state()),
            Extension(pool),
            HeaderMap::new(),
            Some(Json(request)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn login_wrong_signer_rejected() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let state = auth_state();

        let claimed = PrivateKeySigner::random();
        let payload = generate_payload(&claimed.address(), 1, &state.config, Utc::now());
        let message = serde_json::to_string(&payload)?;
        let intruder = PrivateKeySigner::random();
        let signature = intruder.sign_message_sync(message.as_bytes())?;

        let request = EthereumLoginRequest {
            address: claimed.address().to_checksum(None),
            signature: hex::encode_prefixed(signature.as_bytes()),
            message,
        };
        let response = login(
            Extension(state),
            Extension(pool),
            HeaderMap::new(),
            Some(Json(request)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}

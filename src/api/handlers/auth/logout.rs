//! Logout endpoint.

use crate::api::handlers::auth::session::{clear_session_cookie, extract_session_token};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::auth::storage::delete_session;
use axum::extract::Extension;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

/// Terminate the current session.
///
/// Idempotent: answers 204 whether or not a session existed, and always
/// clears the cookie.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session terminated"),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(pool): Extension<PgPool>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(err) = delete_session(&pool, &token).await {
            error!("failed to delete session: {err:#}");
        }
    }

    let cookie = clear_session_cookie(state.config.session_cookie_secure());
    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

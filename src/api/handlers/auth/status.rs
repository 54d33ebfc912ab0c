//! Session introspection endpoints.

use crate::api::handlers::auth::ethereum::UserDirectory;
use crate::api::handlers::auth::session::extract_session_token;
use crate::api::handlers::auth::storage::{lookup_session, PgUserDirectory};
use crate::api::handlers::auth::utils::{valid_wallet_address, wallet_storage_key};
use alloy_primitives::Address;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::PgPool;
use tracing::{debug, error};

use super::types::{SessionResponse, WalletStatusQuery, WalletStatusResponse, USER_TYPE_ETHEREUM};

/// Describe the active session, if any.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 204, description = "No active session"),
        (status = 500, description = "Internal error"),
    ),
    tag = "auth"
)]
pub async fn session(Extension(pool): Extension<PgPool>, headers: HeaderMap) -> Response {
    let Some(token) = extract_session_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match lookup_session(&pool, &token).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(SessionResponse {
                user_id: record.user_id,
                email: record.email,
                wallet_address: record.wallet_address,
                user_type: USER_TYPE_ETHEREUM.to_string(),
            }),
        )
            .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("failed to resolve session: {err:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// Report whether the active session belongs to the given wallet.
///
/// Never fails outward; every error path degrades to `false`.
#[utoipa::path(
    get,
    path = "/v1/auth/wallet/status",
    params(WalletStatusQuery),
    responses(
        (status = 200, description = "Wallet session status", body = WalletStatusResponse),
    ),
    tag = "auth"
)]
pub async fn wallet_status(
    Extension(pool): Extension<PgPool>,
    headers: HeaderMap,
    query: Result<Query<WalletStatusQuery>, QueryRejection>,
) -> Response {
    let logged_in = wallet_session_matches(&pool, &headers, query).await;
    (StatusCode::OK, Json(WalletStatusResponse { logged_in })).into_response()
}

async fn wallet_session_matches(
    pool: &PgPool,
    headers: &HeaderMap,
    query: Result<Query<WalletStatusQuery>, QueryRejection>,
) -> bool {
    let Ok(Query(query)) = query else {
        return false;
    };
    if !valid_wallet_address(&query.address) {
        return false;
    }
    let Ok(address) = query.address.trim().parse::<Address>() else {
        return false;
    };
    let wallet_key = wallet_storage_key(&address);

    let Some(token) = extract_session_token(headers) else {
        return false;
    };
    let session = match lookup_session(pool, &token).await {
        Ok(Some(session)) => session,
        Ok(None) => return false,
        Err(err) => {
            debug!("wallet status session lookup failed: {err:#}");
            return false;
        }
    };

    let directory = PgUserDirectory::new(pool.clone());
    let user = match directory.find_by_wallet(&wallet_key).await {
        Ok(Some(user)) => user,
        Ok(None) => return false,
        Err(err) => {
            debug!("wallet status user lookup failed: {err:#}");
            return false;
        }
    };

    user.id == session.user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn session_without_token_is_no_content() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = session(Extension(pool), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn wallet_status_rejects_malformed_address() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let query = Ok(Query(WalletStatusQuery {
            address: "not-an-address".to_string(),
        }));
        let response = wallet_status(Extension(pool), HeaderMap::new(), query).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let status: WalletStatusResponse = serde_json::from_slice(&body)?;
        assert!(!status.logged_in);
        Ok(())
    }

    #[tokio::test]
    async fn wallet_status_without_token_is_logged_out() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let query = Ok(Query(WalletStatusQuery {
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
        }));
        let response = wallet_status(Extension(pool), HeaderMap::new(), query).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let status: WalletStatusResponse = serde_json::from_slice(&body)?;
        assert!(!status.logged_in);
        Ok(())
    }
}

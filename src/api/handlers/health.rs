//! Health probe handler.

use crate::api::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{debug, error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    session_store: String,
}

/// Acquire a connection and ping it. Users and sessions live in Postgres,
/// so a failed ping means logins and session lookups fail as well.
async fn probe_session_store(pool: &PgPool) -> bool {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );

    let mut conn = match pool.acquire().instrument(acquire_span).await {
        Ok(conn) => conn,
        Err(err) => {
            error!("Failed to acquire session store connection: {err}");
            return false;
        }
    };

    let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");

    match conn.ping().instrument(ping_span).await {
        Ok(()) => true,
        Err(err) => {
            error!("Failed to ping session store: {err}");
            false
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Session store is reachable", body = [Health]),
        (status = 503, description = "Session store is unreachable", body = [Health])
    ),
    tag = "health"
)]
pub async fn health(method: Method, pool: Extension<PgPool>) -> impl IntoResponse {
    let reachable = probe_session_store(&pool.0).await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_store: if reachable {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    // OPTIONS is used for preflight checks; only GET carries a body.
    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = health.commit.get(0..7).unwrap_or_default();

    let mut headers = HeaderMap::new();

    match format!("{}:{}:{}", health.name, health.version, short_hash).parse::<HeaderValue>() {
        Ok(x_app) => {
            debug!("X-App header: {x_app:?}");
            headers.insert("X-App", x_app);
        }
        Err(err) => {
            error!("Failed to parse X-App header: {err}");
        }
    }

    let status = if reachable {
        debug!("Session store is reachable");
        StatusCode::OK
    } else {
        debug!("Session store is unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_body_names_the_session_store() -> anyhow::Result<()> {
        let health = Health {
            commit: "0123456789abcdef".to_string(),
            name: "firma".to_string(),
            version: "0.1.0".to_string(),
            session_store: "ok".to_string(),
        };

        let json = serde_json::to_value(&health)?;

        assert_eq!(json["session_store"], "ok");
        assert_eq!(json["name"], "firma");

        Ok(())
    }

    #[tokio::test]
    async fn health_reports_unreachable_store() -> anyhow::Result<()> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(250))
            .connect_lazy("postgres://postgres@127.0.0.1:1/postgres")?;

        assert!(!probe_session_store(&pool).await);

        Ok(())
    }
}

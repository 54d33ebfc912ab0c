//! Postgres persistence for wallet users and their sessions.
//!
//! Sessions are stored hash-only. The raw token exists in the database for
//! the lifetime of an INSERT bind and nowhere else.

use crate::api::handlers::auth::ethereum::{UserDirectory, WalletUser};
use crate::api::handlers::auth::utils::{
    generate_session_token, hash_session_token, is_unique_violation,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::net::IpAddr;
use tracing::{info_span, Instrument};
use uuid::Uuid;

const SESSION_TOKEN_ATTEMPTS: usize = 3;

/// Request details recorded alongside a session.
#[derive(Debug, Clone, Default)]
pub struct SessionMetadata {
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// Resolved session identity, joined with the owning user.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub email: String,
    pub wallet_address: String,
}

/// [`UserDirectory`] backed by the `users` table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<WalletUser>> {
        let query = "SELECT id, email, wallet_address FROM users WHERE wallet_address = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row: Option<(Uuid, String, String)> = sqlx::query_as(query)
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by wallet address")?;
        Ok(row.map(|(id, email, wallet_address)| WalletUser {
            id,
            email,
            wallet_address,
        }))
    }

    async fn create_with_wallet(&self, email: &str, wallet_address: &str) -> Result<WalletUser> {
        let id = Uuid::now_v7();
        let query = "INSERT INTO users (id, email, wallet_address) VALUES ($1, $2, $3)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let inserted = sqlx::query(query)
            .bind(id)
            .bind(email)
            .bind(wallet_address)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match inserted {
            Ok(_) => Ok(WalletUser {
                id,
                email: email.to_string(),
                wallet_address: wallet_address.to_string(),
            }),
            // Lost a concurrent insert race; the winning row is authoritative.
            Err(err) if is_unique_violation(&err) => self
                .find_by_wallet(wallet_address)
                .await?
                .context("user missing after unique violation"),
            Err(err) => Err(err).context("failed to create user"),
        }
    }
}

/// Create a session row for `user_id` and return the raw token.
///
/// Retries a few times on the (unlikely) token hash collision before giving
/// up.
pub async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
    metadata: &SessionMetadata,
) -> Result<String> {
    let query = "INSERT INTO user_sessions (user_id, session_hash, expires_at, ip_address, user_agent) \
                 VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'), $4, $5)";
    for _ in 0..SESSION_TOKEN_ATTEMPTS {
        let token = generate_session_token()?;
        let session_hash = hash_session_token(&token);
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let inserted = sqlx::query(query)
            .bind(user_id)
            .bind(&session_hash)
            .bind(ttl_seconds)
            .bind(metadata.ip_address)
            .bind(metadata.user_agent.as_deref())
            .execute(pool)
            .instrument(span)
            .await;

        match inserted {
            Ok(_) => return Ok(token),
            Err(err) if is_unique_violation(&err) => continue,
            Err(err) => return Err(err).context("failed to create session"),
        }
    }
    bail!("failed to allocate a unique session token")
}

/// Resolve a raw session token to its identity, touching `last_seen_at`.
///
/// Returns `None` for unknown and expired tokens alike.
pub async fn lookup_session(pool: &PgPool, token: &str) -> Result<Option<SessionRecord>> {
    let session_hash = hash_session_token(token);
    let query = "SELECT u.id, u.email, u.wallet_address \
                 FROM user_sessions s JOIN users u ON u.id = s.user_id \
                 WHERE s.session_hash = $1 AND s.expires_at > NOW()";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row: Option<(Uuid, String, String)> = sqlx::query_as(query)
        .bind(&session_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up session")?;

    let Some((user_id, email, wallet_address)) = row else {
        return Ok(None);
    };

    let query = "UPDATE user_sessions SET last_seen_at = NOW() WHERE session_hash = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&session_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to touch session")?;

    Ok(Some(SessionRecord {
        user_id,
        email,
        wallet_address,
    }))
}

/// Delete the session for a raw token. Deleting an unknown token is a no-op.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<()> {
    let session_hash = hash_session_token(token);
    let query = "DELETE FROM user_sessions WHERE session_hash = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(&session_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}

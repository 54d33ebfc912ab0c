//! Shared state for wallet authentication handlers.

use crate::api::handlers::auth::rate_limit::RateLimiter;
use std::sync::Arc;

pub const DEFAULT_STATEMENT: &str = "Please sign in.";
pub const DEFAULT_PAYLOAD_TTL_SECONDS: i64 = 86_400;
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 86_400;

/// Configuration for challenge issuance and verification.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    domain: String,
    origin: String,
    chain_id: u64,
    statement: String,
    payload_ttl_seconds: i64,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(domain: &str, origin: &str, chain_id: u64) -> Self {
        Self {
            domain: domain.to_string(),
            origin: origin.to_string(),
            chain_id,
            statement: DEFAULT_STATEMENT.to_string(),
            payload_ttl_seconds: DEFAULT_PAYLOAD_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_statement(mut self, statement: &str) -> Self {
        self.statement = statement.to_string();
        self
    }

    #[must_use]
    pub fn with_payload_ttl(mut self, seconds: i64) -> Self {
        self.payload_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub const fn payload_ttl_seconds(&self) -> i64 {
        self.payload_ttl_seconds
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Session cookies carry the Secure attribute only when the origin is
    /// served over TLS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.origin.starts_with("https://")
    }
}

/// State shared by the wallet authentication handlers.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            config,
            rate_limiter,
        }
    }
}

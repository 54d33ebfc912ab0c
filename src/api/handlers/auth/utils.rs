//! Small helpers for wallet normalization and session token handling.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};

/// String-level sanity check for a wallet address before parsing.
pub(super) fn valid_wallet_address(address: &str) -> bool {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").is_ok_and(|regex| regex.is_match(address.trim()))
}

/// Canonical storage key for a wallet address: lowercased 0x-prefixed hex.
/// Lookups and uniqueness checks always go through this form.
pub(super) fn wallet_storage_key(address: &Address) -> String {
    address.to_checksum(None).to_lowercase()
}

/// Synthetic email bound to a wallet-born user record.
///
/// Expects the canonical (lowercased) wallet key so the email is stable
/// across logins regardless of how the client cased the address.
pub(super) fn synthetic_wallet_email(wallet_key: &str) -> String {
    format!("{wallet_key}@wallet.eth")
}

/// Mint a fresh 256-bit session token.
/// The raw value goes to the client once; only its hash is persisted.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Digest a session token for storage and lookups.
/// Raw tokens never touch the database; lookups compare digests.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Extract a client IP for rate limiting and session metadata from common proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

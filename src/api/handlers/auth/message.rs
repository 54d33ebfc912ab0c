//! Login challenge generation and verification.
//!
//! The challenge round-trips through the client as serialized JSON. The
//! wallet signs that exact text, so verification here re-parses the text and
//! recovers the signer from the signature over the same bytes.

use crate::api::handlers::auth::state::AuthConfig;
use crate::api::handlers::auth::types::LoginPayload;
use alloy_primitives::{hex, Address, Signature};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

pub const PAYLOAD_VERSION: &str = "1";

/// Reasons a signed login message is rejected.
///
/// All of these are terminal for the attempt; the client retries by
/// requesting a fresh challenge.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed login message: {0}")]
    InvalidFormat(#[from] serde_json::Error),
    #[error("login message expired at {expiration_time}")]
    Expired { expiration_time: DateTime<Utc> },
    #[error("login message not valid before {invalid_before}")]
    NotYetValid { invalid_before: DateTime<Utc> },
    #[error("login message address does not match the claimed address")]
    AddressMismatch,
    #[error("login message domain {found:?} does not match {expected:?}")]
    DomainMismatch { expected: String, found: String },
    #[error("signature was not produced by the claimed address")]
    InvalidSignature,
}

/// Build a fresh challenge for `address`.
///
/// The chain id is passed in separately so callers can apply a per-request
/// override before falling back to the configured default.
pub fn generate_payload(
    address: &Address,
    chain_id: u64,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> LoginPayload {
    LoginPayload {
        domain: config.domain().to_string(),
        address: address.to_checksum(None),
        statement: config.statement().to_string(),
        uri: config.origin().to_string(),
        version: PAYLOAD_VERSION.to_string(),
        chain_id: chain_id.to_string(),
        nonce: Uuid::new_v4().simple().to_string(),
        issued_at: now,
        expiration_time: now + Duration::seconds(config.payload_ttl_seconds()),
        invalid_before: now,
        resources: Vec::new(),
    }
}

/// Verify a signed login message against the claimed address.
///
/// Checks run in a fixed order so the first failure wins: parse, expiry
/// window, address match, domain match, signature recovery. Time-window and
/// address checks come before the signature so a stale or mismatched message
/// is rejected even when its signature is genuine.
pub fn validate_login_message(
    message: &str,
    claimed_address: &str,
    signature: &str,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> Result<LoginPayload, ValidationError> {
    let payload: LoginPayload = serde_json::from_str(message)?;

    if now > payload.expiration_time {
        return Err(ValidationError::Expired {
            expiration_time: payload.expiration_time,
        });
    }

    if now < payload.invalid_before {
        return Err(ValidationError::NotYetValid {
            invalid_before: payload.invalid_before,
        });
    }

    // Typed comparison makes the address check case-insensitive.
    let claimed: Address = claimed_address
        .trim()
        .parse()
        .map_err(|_| ValidationError::AddressMismatch)?;
    let embedded: Address = payload
        .address
        .parse()
        .map_err(|_| ValidationError::AddressMismatch)?;
    if embedded != claimed {
        return Err(ValidationError::AddressMismatch);
    }

    if payload.domain != config.domain() {
        return Err(ValidationError::DomainMismatch {
            expected: config.domain().to_string(),
            found: payload.domain.clone(),
        });
    }

    let recovered =
        recover_message_signer(message, signature).ok_or(ValidationError::InvalidSignature)?;
    if recovered != claimed {
        return Err(ValidationError::InvalidSignature);
    }

    Ok(payload)
}

/// Recover the EIP-191 signer of `message` from a 65-byte hex signature.
fn recover_message_signer(message: &str, signature: &str) -> Option<Address> {
    let bytes = hex::decode(signature.trim()).ok()?;
    let signature = Signature::from_raw(&bytes).ok()?;
    signature.recover_address_from_msg(message.as_bytes()).ok()
}

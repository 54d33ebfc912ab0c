//! Wallet login orchestration.
//!
//! Verifies a signed challenge and resolves it to a user record through the
//! [`UserDirectory`] seam. Storage is only touched after the message has been
//! fully verified.

use crate::api::handlers::auth::message::{validate_login_message, ValidationError};
use crate::api::handlers::auth::state::AuthConfig;
use crate::api::handlers::auth::types::EthereumLoginRequest;
use crate::api::handlers::auth::utils::{synthetic_wallet_email, wallet_storage_key};
use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User record as seen by the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletUser {
    pub id: Uuid,
    pub email: String,
    pub wallet_address: String,
}

/// Result of a successful login: the resolved user and whether this attempt
/// created the record.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: WalletUser,
    pub is_new_user: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EthereumLoginError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user directory error: {0}")]
    Directory(anyhow::Error),
}

/// Lookup and creation of wallet-born users.
///
/// Addresses passed here are always the canonical lowercased form.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_wallet(&self, wallet_address: &str) -> anyhow::Result<Option<WalletUser>>;
    async fn create_with_wallet(
        &self,
        email: &str,
        wallet_address: &str,
    ) -> anyhow::Result<WalletUser>;
}

/// Verify a login request and resolve the signing wallet to a user.
///
/// Blank credential fields fail before any verification work. Validation
/// failures return without touching the directory.
pub async fn handle_ethereum_login(
    directory: &dyn UserDirectory,
    config: &AuthConfig,
    request: &EthereumLoginRequest,
    now: DateTime<Utc>,
) -> Result<LoginOutcome, EthereumLoginError> {
    if request.address.trim().is_empty()
        || request.signature.trim().is_empty()
        || request.message.trim().is_empty()
    {
        return Err(EthereumLoginError::MissingCredentials);
    }

    let payload = validate_login_message(
        &request.message,
        &request.address,
        &request.signature,
        config,
        now,
    )?;

    let address: Address = payload
        .address
        .parse()
        .map_err(|_| ValidationError::AddressMismatch)?;
    let wallet_key = wallet_storage_key(&address);

    if let Some(user) = directory
        .find_by_wallet(&wallet_key)
        .await
        .map_err(EthereumLoginError::Directory)?
    {
        return Ok(LoginOutcome {
            user,
            is_new_user: false,
        });
    }

    let email = synthetic_wallet_email(&wallet_key);
    let user = directory
        .create_with_wallet(&email, &wallet_key)
        .await
        .map_err(EthereumLoginError::Directory)?;

    Ok(LoginOutcome {
        user,
        is_new_user: true,
    })
}

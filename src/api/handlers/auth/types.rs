//! Wire types for the Ethereum wallet authentication endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Provider tag reported in login and session responses.
pub const USER_TYPE_ETHEREUM: &str = "ethereum";

/// Request body for `POST /v1/auth/ethereum/payload`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayloadRequest {
    /// Wallet address that intends to sign in.
    pub address: String,
    /// Optional chain id override, decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// Challenge handed to the wallet for signing.
///
/// Clients sign the exact serialized JSON text they received; any
/// re-serialization on their side would change the signed bytes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginPayload {
    /// Domain expected to request the signature.
    pub domain: String,
    /// Checksummed wallet address the challenge was issued for.
    pub address: String,
    /// Human-readable statement shown by the wallet.
    pub statement: String,
    /// Origin URI of the service.
    pub uri: String,
    /// Challenge format version.
    pub version: String,
    /// Chain id, decimal string.
    pub chain_id: String,
    /// Single-use random value.
    pub nonce: String,
    #[schema(value_type = String, format = DateTime)]
    pub issued_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub expiration_time: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub invalid_before: DateTime<Utc>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Request body for `POST /v1/auth/ethereum/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EthereumLoginRequest {
    /// Claimed wallet address.
    pub address: String,
    /// EIP-191 signature over `message`, 0x-prefixed hex.
    pub signature: String,
    /// Exact challenge text that was signed.
    pub message: String,
}

/// Identity returned after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub wallet_address: String,
    pub user_type: String,
    pub is_new_user: bool,
}

/// Identity of the active session, returned by `GET /v1/auth/session`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
    pub wallet_address: String,
    pub user_type: String,
}

/// Query parameters for `GET /v1/auth/wallet/status`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct WalletStatusQuery {
    /// Wallet address to check.
    pub address: String,
}

/// Response body for `GET /v1/auth/wallet/status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletStatusResponse {
    pub logged_in: bool,
}

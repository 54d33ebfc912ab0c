//! Ethereum wallet authentication.
//!
//! Challenge-response login: the service issues a payload, the wallet signs
//! it, and a verified signature binds the wallet to a user record and an
//! opaque session.

pub mod ethereum;
pub mod login;
pub mod logout;
pub mod message;
pub mod payload;
pub mod rate_limit;
pub mod session;
pub mod state;
pub mod status;
pub mod storage;
pub mod types;
mod utils;

pub use rate_limit::NoopRateLimiter;
pub use state::{AuthConfig, AuthState};

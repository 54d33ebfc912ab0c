//! API handlers.
//!
//! Route handlers for wallet authentication, session introspection, and the
//! service probes.

pub mod auth;
pub mod health;
pub mod root;

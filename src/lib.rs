//! # Firma (Sign-In with Ethereum sessions)
//!
//! `firma` is an HTTP service that authenticates wallet owners with the
//! challenge-response flow from EIP-4361: the client requests a login payload,
//! signs its serialized form with the wallet key (EIP-191 personal message),
//! and posts the signature back to mint a session.
//!
//! Accounts are keyed by wallet address. The first successful login creates the
//! user row with a synthetic `<address>@wallet.eth` email; later logins reuse it.
//!
//! ## Sessions
//!
//! Session tokens are random 256-bit values handed to the client once, as a
//! cookie and a bearer copy. Only the SHA-256 hash of a token is stored in
//! `PostgreSQL`, so a database leak does not leak usable credentials. Expiry is
//! enforced in SQL (`expires_at > NOW()`) and rows are pruned by expiry index.
//!
//! ## Statelessness
//!
//! The login payload is self-contained: nonce, issue and expiry timestamps all
//! travel inside the signed message, so no server-side challenge store is
//! needed and any replica can verify any payload.

pub mod api;
pub mod cli;

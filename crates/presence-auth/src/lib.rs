//! # presence-auth
//!
//! Resolves the caller identity of a presence request from its bearer
//! access token. Tokens are issued elsewhere; this crate only validates
//! them (signature, expiry, type) and consults the revocation blocklist.

pub mod jwt;

pub use jwt::claims::{Claims, TokenType};
pub use jwt::decoder::JwtDecoder;

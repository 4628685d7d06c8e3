//! Identity tokens for the doctors portal.
//!
//! This crate provides HS256 JWT generation and validation for tokens that
//! carry a user's email claim.

mod error;
mod jwt;

pub use error::*;
pub use jwt::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "doctors-portal";

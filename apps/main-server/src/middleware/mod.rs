//! Request middleware.

pub mod auth;

pub use auth::{AuthenticatedUser, admin_middleware, auth_middleware, authenticate, require_admin};

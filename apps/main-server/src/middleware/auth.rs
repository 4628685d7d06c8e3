//! Authentication middleware.

use std::sync::Arc;

use auth::JwtManager;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use booking_store::BookingStore;
use entities::User;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Identity attached to requests that passed `auth_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Email carried by the token.
    pub email: String,
}

/// Verifies the raw `Authorization` header value.
///
/// The value may be `Bearer <token>` or the bare token. A missing header or
/// one without a token is `AuthenticationRequired` (401); anything that fails
/// verification is `InvalidCredentials` (403).
pub fn authenticate(jwt_manager: &JwtManager, header: Option<&str>) -> ServerResult<AuthenticatedUser> {
    let header = header.ok_or(ServerError::AuthenticationRequired)?.trim();
    let token = header.strip_prefix("Bearer").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(ServerError::AuthenticationRequired);
    }

    match jwt_manager.validate_token(token) {
        Ok(claims) => Ok(AuthenticatedUser {
            email: claims.user_email,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected identity token");
            Err(ServerError::InvalidCredentials)
        }
    }
}

/// Loads the user behind `email` and requires the admin role.
pub async fn require_admin<S: BookingStore + ?Sized>(store: &S, email: &str) -> ServerResult<User> {
    match store.get_user_by_email(email).await? {
        Some(user) if user.is_admin() => Ok(user),
        _ => {
            tracing::warn!(email = %email, "Admin route refused");
            Err(ServerError::PermissionDenied("You are not an admin".to_string()))
        }
    }
}

/// Authentication middleware.
///
/// Validates the identity token and stores the authenticated user in the
/// request extensions.
pub async fn auth_middleware<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    match authenticate(&state.jwt_manager, header) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Admin middleware. Must run after `auth_middleware`.
pub async fn admin_middleware<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(email) = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.email.clone())
    else {
        return ServerError::AuthenticationRequired.into_response();
    };

    match require_admin(state.store.as_ref(), &email).await {
        Ok(_) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

//! User endpoints.

use std::sync::Arc;

use api_protocol::{
    requests::{EmailQuery, SetUserRequest},
    responses::{DeleteResult, InsertResult, SetUserResponse, UpdateResult},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use booking_store::BookingStore;
use entities::User;

use super::parse_id;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

fn required_email(query: EmailQuery) -> ServerResult<String> {
    query
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("email is required".to_string()))
}

/// Registers a user or signs them in, returning a fresh token.
pub async fn set_user<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<SetUserRequest>,
) -> ServerResult<Json<SetUserResponse>> {
    let sign_in = state
        .registry
        .register_or_sign_in(&request.email, &request.name)
        .await?;

    let result = if sign_in.already_registered {
        InsertResult::rejected(format!("welcome back! {}", sign_in.user.name))
    } else {
        InsertResult::inserted(sign_in.user.id)
    };

    Ok(Json(SetUserResponse {
        result,
        user_token: sign_in.token,
        already_registered: sign_in.already_registered,
    }))
}

/// Lists all users.
pub async fn list_users<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.registry.list_all().await?))
}

/// Gets the user record for `?email=`.
pub async fn get_user<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<EmailQuery>,
) -> ServerResult<Json<User>> {
    let email = required_email(query)?;
    Ok(Json(state.registry.get_by_email(&email).await?))
}

/// Grants the admin role to `?email=`.
pub async fn promote_user<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<EmailQuery>,
) -> ServerResult<Json<UpdateResult>> {
    let email = required_email(query)?;
    Ok(Json(state.registry.promote(&email).await?))
}

/// Deletes a user.
pub async fn delete_user<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResult>> {
    let result = state.registry.delete_by_id(parse_id(&id)?, &user.email).await?;
    Ok(Json(result))
}

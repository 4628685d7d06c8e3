//! Booking endpoints.

use std::sync::Arc;

use api_protocol::{
    requests::{CreateBookingRequest, DateQuery},
    responses::{DeleteResult, InsertResult},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use booking_store::BookingStore;
use entities::Booking;

use super::parse_id;
use crate::error::ServerResult;
use crate::middleware::AuthenticatedUser;
use crate::services::BookingOutcome;
use crate::state::AppState;

/// Books a slot for the caller.
pub async fn create_booking<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> ServerResult<Json<InsertResult>> {
    let result = match state.ledger.create(request, &user.email).await? {
        BookingOutcome::Created(booking) => InsertResult::inserted(booking.id),
        BookingOutcome::Rejected(message) => InsertResult::rejected(message),
    };

    Ok(Json(result))
}

/// Lists the caller's bookings, optionally on `?date=`.
pub async fn list_bookings<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<DateQuery>,
) -> ServerResult<Json<Vec<Booking>>> {
    let bookings = state
        .ledger
        .list_for_user(&user.email, query.date.as_deref())
        .await?;

    Ok(Json(bookings))
}

/// Gets a booking by ID.
pub async fn get_booking<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Booking>> {
    let booking = state.ledger.get_by_id(parse_id(&id)?).await?;
    Ok(Json(booking))
}

/// Deletes one of the caller's bookings.
pub async fn delete_booking<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResult>> {
    let result = state.ledger.delete_by_id(parse_id(&id)?, &user.email).await?;
    Ok(Json(result))
}

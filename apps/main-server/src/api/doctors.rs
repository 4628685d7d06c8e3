//! Doctor directory endpoints.

use std::sync::Arc;

use api_protocol::{
    requests::{CreateDoctorRequest, EmailQuery},
    responses::{DeleteResult, InsertResult},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use booking_store::BookingStore;
use entities::Doctor;

use super::parse_id;
use crate::error::ServerResult;
use crate::state::AppState;

/// Adds a doctor.
pub async fn add_doctor<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<EmailQuery>,
    Json(request): Json<CreateDoctorRequest>,
) -> ServerResult<Json<InsertResult>> {
    Ok(Json(state.doctors.add(request, query.email).await?))
}

/// Lists doctors.
pub async fn list_doctors<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Doctor>>> {
    Ok(Json(state.doctors.list().await?))
}

/// Deletes a doctor.
pub async fn delete_doctor<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResult>> {
    Ok(Json(state.doctors.delete_by_id(parse_id(&id)?).await?))
}

//! Availability endpoints.

use std::sync::Arc;

use api_protocol::requests::DateQuery;
use axum::{
    Json,
    extract::{Query, State},
};
use booking_store::BookingStore;
use entities::{TreatmentName, TreatmentOption};

use crate::error::{ServerError, ServerResult};
use crate::services::{options_for_date, treatment_names};
use crate::state::AppState;

/// Lists every treatment with the slots still free on `?date=`.
pub async fn list_options<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DateQuery>,
) -> ServerResult<Json<Vec<TreatmentOption>>> {
    let date = query
        .date
        .filter(|date| !date.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("date is required".to_string()))?;

    let options = options_for_date(state.store.as_ref(), &date).await?;

    Ok(Json(options))
}

/// Lists treatment names.
pub async fn list_treatment_names<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<TreatmentName>>> {
    Ok(Json(treatment_names(state.store.as_ref()).await?))
}

//! Payment endpoints.

use std::sync::Arc;

use api_protocol::{
    requests::{ConfirmPaymentRequest, PaymentIntentRequest},
    responses::{ConfirmPaymentResponse, PaymentIntentResponse},
};
use axum::{Json, extract::State};
use booking_store::BookingStore;

use crate::error::ServerResult;
use crate::state::AppState;

/// Creates a card payment intent for the posted price.
pub async fn create_payment_intent<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<PaymentIntentRequest>,
) -> ServerResult<Json<PaymentIntentResponse>> {
    let intent = state.payments.create_intent(request.price).await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Records a confirmed payment and marks its booking paid.
pub async fn confirm_payment<S: BookingStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> ServerResult<Json<ConfirmPaymentResponse>> {
    Ok(Json(state.payments.confirm_payment(request).await?))
}

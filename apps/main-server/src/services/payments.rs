//! Payment intents and paid-flag reconciliation.

use std::sync::Arc;

use api_protocol::{
    requests::ConfirmPaymentRequest,
    responses::{ConfirmPaymentResponse, PaymentOutcome},
};
use booking_store::{BookingStore, PaidTransition};
use entities::PaymentRecord;
use uuid::Uuid;

use super::gateway::{PaymentGateway, PaymentIntent};
use crate::error::{ServerError, ServerResult};

/// Payment method types offered to the client.
const PAYMENT_METHOD_TYPES: &[&str] = &["card"];

/// Largest amount, in minor units, the gateway accepts for one intent.
pub const MAX_AMOUNT_MINOR: i64 = 99_999_999;

/// Converts a major-unit price into minor units (cents).
pub fn to_minor_units(price: f64) -> ServerResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(ServerError::InvalidRequest(format!("Invalid price: {price}")));
    }
    let amount = (price * 100.0).round();
    if amount > MAX_AMOUNT_MINOR as f64 {
        return Err(ServerError::InvalidRequest(format!(
            "Price {price} exceeds the payment limit"
        )));
    }
    Ok(amount as i64)
}

/// Creates payment intents and records confirmed payments.
pub struct PaymentReconciler<S: BookingStore> {
    store: Arc<S>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    currency: String,
}

impl<S: BookingStore> PaymentReconciler<S> {
    /// Creates a reconciler. Without a gateway, intent creation fails with
    /// `PaymentsUnavailable` while confirmations keep working.
    pub fn new(
        store: Arc<S>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            currency: currency.into(),
        }
    }

    /// Requests a card payment intent for `price`.
    pub async fn create_intent(&self, price: f64) -> ServerResult<PaymentIntent> {
        let gateway = self.gateway.as_ref().ok_or(ServerError::PaymentsUnavailable)?;
        let amount = to_minor_units(price)?;

        let intent = gateway
            .create_payment_intent(amount, &self.currency, PAYMENT_METHOD_TYPES)
            .await?;

        tracing::info!(amount, currency = %self.currency, "Payment intent issued");

        Ok(intent)
    }

    /// Marks the booking paid and records the payment.
    ///
    /// The payment is stored only if the booking moved from unpaid to paid,
    /// so confirming twice records a single payment.
    pub async fn confirm_payment(
        &self,
        request: ConfirmPaymentRequest,
    ) -> ServerResult<ConfirmPaymentResponse> {
        let booking_id: Uuid = request
            .booking_id
            .parse()
            .map_err(|_| ServerError::InvalidRequest("Invalid booking_id".to_string()))?;

        let mut payment = PaymentRecord::new(booking_id, request.price);
        if let Some(transaction_id) = request.transaction_id {
            payment = payment.with_transaction_id(transaction_id);
        }
        if let Some(email) = request.email {
            payment = payment.with_email(email);
        }

        let outcome = match self.store.reconcile_payment(payment.clone()).await? {
            PaidTransition::Updated => {
                tracing::info!(booking_id = %booking_id, payment_id = %payment.id, "Booking paid");
                return Ok(ConfirmPaymentResponse {
                    outcome: PaymentOutcome::Updated,
                    payment: Some(payment),
                });
            }
            PaidTransition::AlreadyPaid => {
                tracing::info!(booking_id = %booking_id, "Booking already paid; payment not recorded");
                PaymentOutcome::AlreadyPaid
            }
            PaidTransition::NotFound => {
                tracing::warn!(booking_id = %booking_id, "Payment confirmation for unknown booking");
                PaymentOutcome::NotFound
            }
        };

        Ok(ConfirmPaymentResponse {
            outcome,
            payment: None,
        })
    }
}

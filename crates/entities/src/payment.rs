//! Payment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed payment for a booking.
///
/// Only ever created together with the booking's unpaid to paid transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Booking this payment settles.
    pub booking_id: Uuid,
    /// Amount paid in the configured currency.
    pub price: f64,
    /// Gateway transaction identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Payer email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a new payment record.
    pub fn new(booking_id: Uuid, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            price,
            transaction_id: None,
            email: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the gateway transaction identifier.
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Sets the payer email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

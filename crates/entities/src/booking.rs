//! Booking entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reservation binding one user, one treatment, one date and one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Email of the booking user.
    #[serde(rename = "email")]
    pub user_email: String,
    /// Name of the booked treatment option.
    pub treatment_name: String,
    /// Calendar date as formatted by the client.
    pub appointment_date: String,
    /// Slot label, one of the treatment's slots.
    pub slot: String,
    /// Patient display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Price copied from the treatment at booking time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Whether the booking has been paid.
    #[serde(default)]
    pub paid: bool,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new unpaid booking.
    pub fn new(
        user_email: impl Into<String>,
        treatment_name: impl Into<String>,
        appointment_date: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_email: user_email.into(),
            treatment_name: treatment_name.into(),
            appointment_date: appointment_date.into(),
            slot: slot.into(),
            patient: None,
            phone: None,
            price: None,
            paid: false,
            created_at: Utc::now(),
        }
    }

    /// Sets the patient name.
    pub fn with_patient(mut self, patient: impl Into<String>) -> Self {
        self.patient = Some(patient.into());
        self
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Returns true if this booking occupies the same (user, treatment, date)
    /// key as `other`.
    pub fn same_key(&self, other: &Booking) -> bool {
        self.user_email == other.user_email
            && self.treatment_name == other.treatment_name
            && self.appointment_date == other.appointment_date
    }
}

//! Request bodies and query parameters.

use serde::{Deserialize, Serialize};

/// `?date=` query parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// `?email=` query parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Body of `POST /bookings`.
///
/// Any `email` sent by the client is ignored; the booking is always made
/// for the token's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub treatment_name: String,
    pub appointment_date: String,
    pub slot: String,
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Body of `PUT /setuser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /doctors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub speciality: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `POST /create-payment-intent`. Clients post the whole booking;
/// only the price is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

/// Body of `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[serde(alias = "booking_id")]
    pub booking_id: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_payment_accepts_snake_case_booking_id() {
        let request: ConfirmPaymentRequest = serde_json::from_str(
            r#"{"booking_id":"abc","price":12.5,"transactionId":"pi_1"}"#,
        )
        .unwrap();

        assert_eq!(request.booking_id, "abc");
        assert_eq!(request.transaction_id.as_deref(), Some("pi_1"));
    }

    #[test]
    fn test_create_booking_ignores_client_email() {
        let request: CreateBookingRequest = serde_json::from_str(
            r#"{"treatmentName":"Braces","appointmentDate":"2024-01-01","slot":"9am","email":"x@y.z"}"#,
        )
        .unwrap();

        assert_eq!(request.treatment_name, "Braces");
        assert!(request.patient.is_none());
    }
}

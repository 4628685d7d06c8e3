//! Response envelopes.

use entities::PaymentRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of an insert, or of an insert refused by a business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertResult {
    /// A successful insert.
    pub fn inserted(id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id: Some(id),
            message: None,
        }
    }

    /// A refused insert; nothing was written.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            acknowledged: false,
            inserted_id: None,
            message: Some(message.into()),
        }
    }
}

/// Result of a delete. A missing id yields `deleted_count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Result of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Response of `PUT /setuser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserResponse {
    pub result: InsertResult,
    pub user_token: String,
    pub already_registered: bool,
}

/// Response of `POST /create-payment-intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// What a payment confirmation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// The booking was marked paid and the payment recorded.
    Updated,
    /// The booking was already paid; nothing was written.
    AlreadyPaid,
    /// The booking does not exist; nothing was written.
    NotFound,
}

/// Response of `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub outcome: PaymentOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
}

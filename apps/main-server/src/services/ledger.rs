//! Booking ledger.

use std::sync::Arc;

use api_protocol::{requests::CreateBookingRequest, responses::DeleteResult};
use booking_store::{BookingFilter, BookingStore};
use entities::Booking;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Result of a booking attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// The booking was stored.
    Created(Booking),
    /// The requester already holds a booking for that treatment and date.
    /// Nothing was written.
    Rejected(String),
}

/// Creates, reads and deletes bookings.
pub struct BookingLedger<S: BookingStore> {
    store: Arc<S>,
}

impl<S: BookingStore> BookingLedger<S> {
    /// Creates a ledger over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Books a slot for `requester_email`.
    ///
    /// The treatment must exist and the slot must be one of its labels. At
    /// most one booking per (user, treatment, date) is allowed; a second
    /// attempt is rejected without touching the store.
    pub async fn create(
        &self,
        request: CreateBookingRequest,
        requester_email: &str,
    ) -> ServerResult<BookingOutcome> {
        let treatment = self
            .store
            .get_treatment_option(&request.treatment_name)
            .await?
            .ok_or_else(|| {
                ServerError::InvalidRequest(format!(
                    "Unknown treatment: {}",
                    request.treatment_name
                ))
            })?;

        if !treatment.has_slot(&request.slot) {
            return Err(ServerError::InvalidRequest(format!(
                "{} is not a slot of {}",
                request.slot, treatment.name
            )));
        }

        let rejection = format!(
            "You already have a booking on {}",
            request.appointment_date
        );

        let existing = self
            .store
            .list_bookings(&BookingFilter::for_key(
                requester_email,
                &request.treatment_name,
                &request.appointment_date,
            ))
            .await?;
        if !existing.is_empty() {
            tracing::info!(
                email = %requester_email,
                treatment = %request.treatment_name,
                date = %request.appointment_date,
                "Duplicate booking rejected"
            );
            return Ok(BookingOutcome::Rejected(rejection));
        }

        let mut booking = Booking::new(
            requester_email,
            request.treatment_name,
            request.appointment_date,
            request.slot,
        )
        .with_price(request.price.unwrap_or(treatment.price));
        if let Some(patient) = request.patient {
            booking = booking.with_patient(patient);
        }
        if let Some(phone) = request.phone {
            booking = booking.with_phone(phone);
        }

        match self.store.create_booking(booking).await {
            Ok(booking) => {
                tracing::info!(booking_id = %booking.id, email = %booking.user_email, "Booking created");
                Ok(BookingOutcome::Created(booking))
            }
            // Lost a race against a concurrent create for the same key.
            Err(e) if e.is_already_exists() => Ok(BookingOutcome::Rejected(rejection)),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists the bookings of one user, optionally on one date.
    pub async fn list_for_user(&self, email: &str, date: Option<&str>) -> ServerResult<Vec<Booking>> {
        let filter = BookingFilter {
            user_email: Some(email.to_string()),
            appointment_date: date.map(str::to_string),
            ..Default::default()
        };
        Ok(self.store.list_bookings(&filter).await?)
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: Uuid) -> ServerResult<Booking> {
        self.store
            .get_booking(id)
            .await?
            .ok_or_else(|| ServerError::NotFound("Booking not found".to_string()))
    }

    /// Deletes a booking owned by `requester_email`, or any booking when the
    /// requester is an admin. A missing booking deletes nothing.
    pub async fn delete_by_id(&self, id: Uuid, requester_email: &str) -> ServerResult<DeleteResult> {
        let Some(booking) = self.store.get_booking(id).await? else {
            return Ok(DeleteResult::new(0));
        };

        if booking.user_email != requester_email {
            let is_admin = self
                .store
                .get_user_by_email(requester_email)
                .await?
                .is_some_and(|user| user.is_admin());
            if !is_admin {
                tracing::warn!(booking_id = %id, email = %requester_email, "Refused to delete foreign booking");
                return Err(ServerError::PermissionDenied(
                    "You can only delete your own bookings".to_string(),
                ));
            }
        }

        let deleted = self.store.delete_booking(id).await?;
        tracing::info!(booking_id = %id, deleted, "Booking deleted");

        Ok(DeleteResult::new(deleted))
    }
}

#[cfg(test)]
mod tests {
    use booking_store::MemoryBookingStore;
    use entities::{TreatmentOption, User, UserRole};

    use super::*;

    async fn ledger() -> (Arc<MemoryBookingStore>, BookingLedger<MemoryBookingStore>) {
        let store = Arc::new(MemoryBookingStore::new());
        store
            .create_treatment_option(
                TreatmentOption::new("Braces", 120.0).with_slots(["9am", "10am"]),
            )
            .await
            .unwrap();
        (store.clone(), BookingLedger::new(store))
    }

    fn request(slot: &str) -> CreateBookingRequest {
        CreateBookingRequest {
            treatment_name: "Braces".to_string(),
            appointment_date: "2024-01-01".to_string(),
            slot: slot.to_string(),
            patient: Some("Alice".to_string()),
            phone: Some("555-0100".to_string()),
            price: None,
        }
    }

    #[tokio::test]
    async fn test_create_uses_requester_email_and_treatment_price() {
        let (_, ledger) = ledger().await;

        let outcome = ledger.create(request("9am"), "a@example.com").await.unwrap();

        let BookingOutcome::Created(booking) = outcome else {
            panic!("expected a created booking");
        };
        assert_eq!(booking.user_email, "a@example.com");
        assert_eq!(booking.price, Some(120.0));
        assert_eq!(booking.patient.as_deref(), Some("Alice"));
        assert_eq!(booking.phone.as_deref(), Some("555-0100"));
        assert!(!booking.paid);
    }

    #[tokio::test]
    async fn test_second_booking_same_day_is_rejected() {
        let (store, ledger) = ledger().await;

        ledger.create(request("9am"), "a@example.com").await.unwrap();
        let second = ledger.create(request("10am"), "a@example.com").await.unwrap();

        assert_eq!(
            second,
            BookingOutcome::Rejected("You already have a booking on 2024-01-01".to_string())
        );
        let stored = store
            .list_bookings(&BookingFilter::for_key("a@example.com", "Braces", "2024-01-01"))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_other_user_may_book_same_day() {
        let (_, ledger) = ledger().await;

        ledger.create(request("9am"), "a@example.com").await.unwrap();
        let outcome = ledger.create(request("10am"), "b@example.com").await.unwrap();

        assert!(matches!(outcome, BookingOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_unknown_treatment_or_slot_is_invalid() {
        let (_, ledger) = ledger().await;

        let mut unknown = request("9am");
        unknown.treatment_name = "Surgery".to_string();
        assert!(matches!(
            ledger.create(unknown, "a@example.com").await,
            Err(ServerError::InvalidRequest(_))
        ));

        assert!(matches!(
            ledger.create(request("5pm"), "a@example.com").await,
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_for_user_filters_by_date() {
        let (_, ledger) = ledger().await;

        ledger.create(request("9am"), "a@example.com").await.unwrap();
        let mut next_day = request("9am");
        next_day.appointment_date = "2024-01-02".to_string();
        ledger.create(next_day, "a@example.com").await.unwrap();
        ledger.create(request("10am"), "b@example.com").await.unwrap();

        assert_eq!(ledger.list_for_user("a@example.com", None).await.unwrap().len(), 2);
        assert_eq!(
            ledger
                .list_for_user("a@example.com", Some("2024-01-02"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_get_missing_booking_is_not_found() {
        let (_, ledger) = ledger().await;

        assert!(matches!(
            ledger.get_by_id(Uuid::new_v4()).await,
            Err(ServerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_owner_or_admin() {
        let (store, ledger) = ledger().await;
        let BookingOutcome::Created(booking) =
            ledger.create(request("9am"), "a@example.com").await.unwrap()
        else {
            panic!("expected a created booking");
        };

        assert!(matches!(
            ledger.delete_by_id(booking.id, "b@example.com").await,
            Err(ServerError::PermissionDenied(_))
        ));

        store
            .create_user(User::new("admin@example.com", "Admin").with_role(UserRole::Admin))
            .await
            .unwrap();
        let result = ledger.delete_by_id(booking.id, "admin@example.com").await.unwrap();
        assert_eq!(result.deleted_count, 1);

        let again = ledger.delete_by_id(booking.id, "a@example.com").await.unwrap();
        assert_eq!(again.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        let (_, ledger) = ledger().await;
        let BookingOutcome::Created(booking) =
            ledger.create(request("9am"), "a@example.com").await.unwrap()
        else {
            panic!("expected a created booking");
        };

        let result = ledger.delete_by_id(booking.id, "a@example.com").await.unwrap();
        assert_eq!(result.deleted_count, 1);
    }
}

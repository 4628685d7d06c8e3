//! Booking store trait definitions.

use async_trait::async_trait;
use entities::{Booking, Doctor, PaymentRecord, TreatmentOption, User, UserRole};
use uuid::Uuid;

use crate::StoreResult;

/// Filter options for listing bookings.
///
/// Every field that is set must match; an empty filter lists everything.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Filter by booking user email.
    pub user_email: Option<String>,
    /// Filter by treatment name.
    pub treatment_name: Option<String>,
    /// Filter by appointment date.
    pub appointment_date: Option<String>,
}

impl BookingFilter {
    /// Filter for all bookings on one date.
    pub fn on_date(date: impl Into<String>) -> Self {
        Self {
            appointment_date: Some(date.into()),
            ..Default::default()
        }
    }

    /// Filter for the (user, treatment, date) uniqueness key.
    pub fn for_key(
        user_email: impl Into<String>,
        treatment_name: impl Into<String>,
        appointment_date: impl Into<String>,
    ) -> Self {
        Self {
            user_email: Some(user_email.into()),
            treatment_name: Some(treatment_name.into()),
            appointment_date: Some(appointment_date.into()),
        }
    }

    /// Returns true if the booking satisfies every set field.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_email
            .as_deref()
            .map_or(true, |email| booking.user_email == email)
            && self
                .treatment_name
                .as_deref()
                .map_or(true, |name| booking.treatment_name == name)
            && self
                .appointment_date
                .as_deref()
                .map_or(true, |date| booking.appointment_date == date)
    }
}

/// Outcome of the conditional paid-flag transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidTransition {
    /// The booking moved from unpaid to paid and the payment was recorded.
    Updated,
    /// The booking was already paid; nothing was written.
    AlreadyPaid,
    /// No booking with that id exists; nothing was written.
    NotFound,
}

/// Trait for portal storage operations.
#[async_trait]
pub trait BookingStore: Send + Sync {
    // =========================================================================
    // Treatment catalog operations
    // =========================================================================

    /// Creates a treatment option. Fails if the name is taken.
    async fn create_treatment_option(
        &self,
        option: TreatmentOption,
    ) -> StoreResult<TreatmentOption>;

    /// Lists the catalog in insertion order.
    async fn list_treatment_options(&self) -> StoreResult<Vec<TreatmentOption>>;

    /// Gets a treatment option by name.
    async fn get_treatment_option(&self, name: &str) -> StoreResult<Option<TreatmentOption>>;

    // =========================================================================
    // Booking operations
    // =========================================================================

    /// Inserts a booking unless one already exists for the same
    /// (user, treatment, date) key, in which case `AlreadyExists` is
    /// returned and nothing is written.
    async fn create_booking(&self, booking: Booking) -> StoreResult<Booking>;

    /// Gets a booking by ID.
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Lists bookings matching the filter in insertion order.
    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>>;

    /// Deletes a booking, returning the number of deleted records.
    async fn delete_booking(&self, id: Uuid) -> StoreResult<u64>;

    /// Marks the referenced booking paid and records the payment as one
    /// atomic unit. The payment is inserted only when the paid flag actually
    /// moved from false to true.
    async fn reconcile_payment(&self, payment: PaymentRecord) -> StoreResult<PaidTransition>;

    /// Lists payment records, optionally for one booking.
    async fn list_payments(&self, booking_id: Option<Uuid>) -> StoreResult<Vec<PaymentRecord>>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a user. Fails if the email is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Lists all users in registration order.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Counts registered users.
    async fn count_users(&self) -> StoreResult<u64>;

    /// Sets the role of an existing user. Returns the updated user, or
    /// `None` when no user has that email.
    async fn set_user_role(&self, email: &str, role: UserRole) -> StoreResult<Option<User>>;

    /// Deletes a user, returning the number of deleted records.
    async fn delete_user(&self, id: Uuid) -> StoreResult<u64>;

    // =========================================================================
    // Doctor operations
    // =========================================================================

    /// Creates a doctor entry. Fails if (email, speciality) is taken.
    async fn create_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;

    /// Finds a doctor by (email, speciality).
    async fn find_doctor(&self, email: &str, speciality: &str) -> StoreResult<Option<Doctor>>;

    /// Lists all doctors.
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;

    /// Deletes a doctor, returning the number of deleted records.
    async fn delete_doctor(&self, id: Uuid) -> StoreResult<u64>;
}

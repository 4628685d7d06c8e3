//! In-memory booking store implementation.

use std::sync::Arc;

use async_trait::async_trait;
use entities::{Booking, Doctor, PaymentRecord, TreatmentOption, User, UserRole};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{BookingFilter, BookingStore, PaidTransition, StoreError, StoreResult};

/// In-memory store for tests and development.
///
/// Collections are kept as insertion-ordered vectors so listings come back
/// in the order records were written.
#[derive(Debug, Default, Clone)]
pub struct MemoryBookingStore {
    treatment_options: Arc<RwLock<Vec<TreatmentOption>>>,
    bookings: Arc<RwLock<Vec<Booking>>>,
    users: Arc<RwLock<Vec<User>>>,
    doctors: Arc<RwLock<Vec<Doctor>>>,
    payments: Arc<RwLock<Vec<PaymentRecord>>>,
}

impl MemoryBookingStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Removes every element with the given id, returning how many went away.
fn remove_by_id<T>(items: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> u64 {
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    (before - items.len()) as u64
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    // =========================================================================
    // Treatment catalog operations
    // =========================================================================

    async fn create_treatment_option(
        &self,
        option: TreatmentOption,
    ) -> StoreResult<TreatmentOption> {
        let mut options = self.treatment_options.write().await;
        if options.iter().any(|o| o.name == option.name) {
            return Err(StoreError::already_exists("TreatmentOption", option.name));
        }
        options.push(option.clone());
        Ok(option)
    }

    async fn list_treatment_options(&self) -> StoreResult<Vec<TreatmentOption>> {
        let options = self.treatment_options.read().await;
        Ok(options.clone())
    }

    async fn get_treatment_option(&self, name: &str) -> StoreResult<Option<TreatmentOption>> {
        let options = self.treatment_options.read().await;
        Ok(options.iter().find(|o| o.name == name).cloned())
    }

    // =========================================================================
    // Booking operations
    // =========================================================================

    async fn create_booking(&self, booking: Booking) -> StoreResult<Booking> {
        // Check and insert under one write guard so concurrent creates for
        // the same key cannot both succeed.
        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|b| b.same_key(&booking)) {
            return Err(StoreError::already_exists(
                "Booking",
                format!(
                    "{}/{}/{}",
                    booking.user_email, booking.treatment_name, booking.appointment_date
                ),
            ));
        }
        bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<u64> {
        let mut bookings = self.bookings.write().await;
        Ok(remove_by_id(&mut bookings, id, |b| b.id))
    }

    async fn reconcile_payment(&self, payment: PaymentRecord) -> StoreResult<PaidTransition> {
        // Lock order: bookings before payments.
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.iter_mut().find(|b| b.id == payment.booking_id) else {
            return Ok(PaidTransition::NotFound);
        };
        if booking.paid {
            return Ok(PaidTransition::AlreadyPaid);
        }

        let mut payments = self.payments.write().await;
        booking.paid = true;
        payments.push(payment);
        Ok(PaidTransition::Updated)
    }

    async fn list_payments(&self, booking_id: Option<Uuid>) -> StoreResult<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|p| booking_id.map_or(true, |id| p.booking_id == id))
            .cloned()
            .collect())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.clone())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }

    async fn set_user_role(&self, email: &str, role: UserRole) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.email == email).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<u64> {
        let mut users = self.users.write().await;
        Ok(remove_by_id(&mut users, id, |u| u.id))
    }

    // =========================================================================
    // Doctor operations
    // =========================================================================

    async fn create_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        let mut doctors = self.doctors.write().await;
        if doctors
            .iter()
            .any(|d| d.email == doctor.email && d.speciality == doctor.speciality)
        {
            return Err(StoreError::already_exists(
                "Doctor",
                format!("{}/{}", doctor.email, doctor.speciality),
            ));
        }
        doctors.push(doctor.clone());
        Ok(doctor)
    }

    async fn find_doctor(&self, email: &str, speciality: &str) -> StoreResult<Option<Doctor>> {
        let doctors = self.doctors.read().await;
        Ok(doctors
            .iter()
            .find(|d| d.email == email && d.speciality == speciality)
            .cloned())
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        let doctors = self.doctors.read().await;
        Ok(doctors.clone())
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<u64> {
        let mut doctors = self.doctors.write().await;
        Ok(remove_by_id(&mut doctors, id, |d| d.id))
    }
}

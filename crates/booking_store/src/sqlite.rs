//! SQLite-backed booking store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{Booking, Doctor, PaymentRecord, TreatmentOption, User, UserRole};
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};
use uuid::Uuid;

use crate::{BookingFilter, BookingStore, PaidTransition, StoreError, StoreResult};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS treatment_options (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        price REAL NOT NULL,
        slots TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        user_email TEXT NOT NULL,
        treatment_name TEXT NOT NULL,
        appointment_date TEXT NOT NULL,
        slot TEXT NOT NULL,
        patient TEXT,
        phone TEXT,
        price REAL,
        paid INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        UNIQUE (user_email, treatment_name, appointment_date)
    )",
    "CREATE INDEX IF NOT EXISTS idx_bookings_date ON bookings (appointment_date)",
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        speciality TEXT NOT NULL,
        image TEXT,
        created_at TEXT NOT NULL,
        UNIQUE (email, speciality)
    )",
    "CREATE TABLE IF NOT EXISTS payments (
        id TEXT PRIMARY KEY,
        booking_id TEXT NOT NULL,
        price REAL NOT NULL,
        transaction_id TEXT,
        email TEXT,
        created_at TEXT NOT NULL
    )",
];

const BOOKING_COLUMNS: &str = "id, user_email, treatment_name, appointment_date, slot, \
     patient, phone, price, paid, created_at";

/// SQLite store. Uniqueness rules are enforced by table constraints.
#[derive(Debug, Clone)]
pub struct SqliteBookingStore {
    pool: SqlitePool,
}

impl SqliteBookingStore {
    /// Connects to the database at `url` and applies the schema.
    ///
    /// `sqlite::memory:` URLs get a single long-lived connection so every
    /// query sees the same database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(url = %url, "SQLite store ready");

        Ok(store)
    }

    /// Creates the tables if they do not exist.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    value
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("invalid id {value}")))
}

/// Maps a unique-constraint violation to `AlreadyExists`.
fn conflict(e: sqlx::Error, entity_type: &'static str, id: String) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::already_exists(entity_type, id)
        }
        _ => StoreError::Database(e),
    }
}

fn treatment_from_row(row: &SqliteRow) -> StoreResult<TreatmentOption> {
    let slots: String = row.try_get("slots")?;
    Ok(TreatmentOption {
        id: parse_uuid(row.try_get("id")?)?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        slots: serde_json::from_str(&slots)?,
    })
}

fn booking_from_row(row: &SqliteRow) -> StoreResult<Booking> {
    Ok(Booking {
        id: parse_uuid(row.try_get("id")?)?,
        user_email: row.try_get("user_email")?,
        treatment_name: row.try_get("treatment_name")?,
        appointment_date: row.try_get("appointment_date")?,
        slot: row.try_get("slot")?,
        patient: row.try_get("patient")?,
        phone: row.try_get("phone")?,
        price: row.try_get("price")?,
        paid: row.try_get("paid")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: parse_uuid(row.try_get("id")?)?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown role {role}")))?,
        created_at: row.try_get("created_at")?,
    })
}

fn doctor_from_row(row: &SqliteRow) -> StoreResult<Doctor> {
    Ok(Doctor {
        id: parse_uuid(row.try_get("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        speciality: row.try_get("speciality")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

fn payment_from_row(row: &SqliteRow) -> StoreResult<PaymentRecord> {
    Ok(PaymentRecord {
        id: parse_uuid(row.try_get("id")?)?,
        booking_id: parse_uuid(row.try_get("booking_id")?)?,
        price: row.try_get("price")?,
        transaction_id: row.try_get("transaction_id")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    // =========================================================================
    // Treatment catalog operations
    // =========================================================================

    async fn create_treatment_option(
        &self,
        option: TreatmentOption,
    ) -> StoreResult<TreatmentOption> {
        sqlx::query("INSERT INTO treatment_options (id, name, price, slots) VALUES (?, ?, ?, ?)")
            .bind(option.id.to_string())
            .bind(&option.name)
            .bind(option.price)
            .bind(serde_json::to_string(&option.slots)?)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict(e, "TreatmentOption", option.name.clone()))?;
        Ok(option)
    }

    async fn list_treatment_options(&self) -> StoreResult<Vec<TreatmentOption>> {
        let rows = sqlx::query("SELECT id, name, price, slots FROM treatment_options ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(treatment_from_row).collect()
    }

    async fn get_treatment_option(&self, name: &str) -> StoreResult<Option<TreatmentOption>> {
        let row = sqlx::query("SELECT id, name, price, slots FROM treatment_options WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(treatment_from_row).transpose()
    }

    // =========================================================================
    // Booking operations
    // =========================================================================

    async fn create_booking(&self, booking: Booking) -> StoreResult<Booking> {
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(booking.id.to_string())
        .bind(&booking.user_email)
        .bind(&booking.treatment_name)
        .bind(&booking.appointment_date)
        .bind(&booking.slot)
        .bind(&booking.patient)
        .bind(&booking.phone)
        .bind(booking.price)
        .bind(booking.paid)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict(
                e,
                "Booking",
                format!(
                    "{}/{}/{}",
                    booking.user_email, booking.treatment_name, booking.appointment_date
                ),
            )
        })?;
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE (? IS NULL OR user_email = ?) \
               AND (? IS NULL OR treatment_name = ?) \
               AND (? IS NULL OR appointment_date = ?) \
             ORDER BY rowid"
        ))
        .bind(&filter.user_email)
        .bind(&filter.user_email)
        .bind(&filter.treatment_name)
        .bind(&filter.treatment_name)
        .bind(&filter.appointment_date)
        .bind(&filter.appointment_date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn reconcile_payment(&self, payment: PaymentRecord) -> StoreResult<PaidTransition> {
        let booking_id = payment.booking_id.to_string();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE bookings SET paid = 1 WHERE id = ? AND paid = 0")
            .bind(&booking_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM bookings WHERE id = ?")
                .bind(&booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            tx.rollback().await?;
            return Ok(if exists {
                PaidTransition::AlreadyPaid
            } else {
                PaidTransition::NotFound
            });
        }

        sqlx::query(
            "INSERT INTO payments (id, booking_id, price, transaction_id, email, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(payment.id.to_string())
        .bind(&booking_id)
        .bind(payment.price)
        .bind(&payment.transaction_id)
        .bind(&payment.email)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PaidTransition::Updated)
    }

    async fn list_payments(&self, booking_id: Option<Uuid>) -> StoreResult<Vec<PaymentRecord>> {
        let booking_id = booking_id.map(|id| id.to_string());
        let rows = sqlx::query(
            "SELECT id, booking_id, price, transaction_id, email, created_at FROM payments \
             WHERE (? IS NULL OR booking_id = ?) ORDER BY rowid",
        )
        .bind(&booking_id)
        .bind(&booking_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(payment_from_row).collect()
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query("INSERT INTO users (id, email, name, role, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict(e, "User", user.email.clone()))?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, email, name, role, created_at FROM users ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn set_user_role(&self, email: &str, role: UserRole) -> StoreResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE email = ?")
            .bind(role.as_str())
            .bind(email)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_by_email(email).await
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Doctor operations
    // =========================================================================

    async fn create_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        sqlx::query(
            "INSERT INTO doctors (id, name, email, speciality, image, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(doctor.id.to_string())
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.speciality)
        .bind(&doctor.image)
        .bind(doctor.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict(e, "Doctor", format!("{}/{}", doctor.email, doctor.speciality)))?;
        Ok(doctor)
    }

    async fn find_doctor(&self, email: &str, speciality: &str) -> StoreResult<Option<Doctor>> {
        let row = sqlx::query(
            "SELECT id, name, email, speciality, image, created_at FROM doctors \
             WHERE email = ? AND speciality = ?",
        )
        .bind(email)
        .bind(speciality)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(doctor_from_row).transpose()
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        let rows = sqlx::query(
            "SELECT id, name, email, speciality, image, created_at FROM doctors ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(doctor_from_row).collect()
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteBookingStore {
        SqliteBookingStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_treatment_round_trip_keeps_slot_order() {
        let store = memory_store().await;

        store
            .create_treatment_option(
                TreatmentOption::new("Braces", 120.5).with_slots(["9am", "10am", "11am"]),
            )
            .await
            .unwrap();

        let fetched = store.get_treatment_option("Braces").await.unwrap().unwrap();
        assert_eq!(fetched.slots, vec!["9am", "10am", "11am"]);
        assert_eq!(fetched.price, 120.5);
        assert!(store.get_treatment_option("Cleaning").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_booking_key_is_unique() {
        let store = memory_store().await;

        let booking = Booking::new("a@example.com", "Braces", "2024-01-01", "9am")
            .with_patient("Alice")
            .with_price(120.0);
        let created = store.create_booking(booking.clone()).await.unwrap();

        let duplicate = store
            .create_booking(Booking::new("a@example.com", "Braces", "2024-01-01", "10am"))
            .await;
        assert!(duplicate.unwrap_err().is_already_exists());

        let fetched = store.get_booking(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.patient.as_deref(), Some("Alice"));
        assert_eq!(fetched.price, Some(120.0));
        assert!(!fetched.paid);
    }

    #[tokio::test]
    async fn test_list_bookings_filters() {
        let store = memory_store().await;

        store
            .create_booking(Booking::new("a@example.com", "Braces", "2024-01-01", "9am"))
            .await
            .unwrap();
        store
            .create_booking(Booking::new("b@example.com", "Braces", "2024-01-01", "10am"))
            .await
            .unwrap();
        store
            .create_booking(Booking::new("a@example.com", "Cleaning", "2024-01-02", "8am"))
            .await
            .unwrap();

        let on_date = store
            .list_bookings(&BookingFilter::on_date("2024-01-01"))
            .await
            .unwrap();
        assert_eq!(on_date.len(), 2);
        assert_eq!(on_date[0].slot, "9am");

        let for_user = store
            .list_bookings(&BookingFilter {
                user_email: Some("a@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_user.len(), 2);

        let all = store.list_bookings(&BookingFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_reconcile_payment_once() {
        let store = memory_store().await;
        let booking = store
            .create_booking(Booking::new("a@example.com", "Braces", "2024-01-01", "9am"))
            .await
            .unwrap();

        let payment = PaymentRecord::new(booking.id, 120.0).with_transaction_id("pi_123");
        assert_eq!(
            store.reconcile_payment(payment).await.unwrap(),
            PaidTransition::Updated
        );
        assert_eq!(
            store
                .reconcile_payment(PaymentRecord::new(booking.id, 120.0))
                .await
                .unwrap(),
            PaidTransition::AlreadyPaid
        );
        assert_eq!(
            store
                .reconcile_payment(PaymentRecord::new(Uuid::new_v4(), 1.0))
                .await
                .unwrap(),
            PaidTransition::NotFound
        );

        let payments = store.list_payments(Some(booking.id)).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].transaction_id.as_deref(), Some("pi_123"));
        assert!(store.get_booking(booking.id).await.unwrap().unwrap().paid);
        assert_eq!(store.list_payments(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_roles() {
        let store = memory_store().await;

        let user = store
            .create_user(User::new("a@example.com", "Alice").with_role(UserRole::Admin))
            .await
            .unwrap();
        store
            .create_user(User::new("b@example.com", "Bob"))
            .await
            .unwrap();
        assert_eq!(store.count_users().await.unwrap(), 2);

        let duplicate = store.create_user(User::new("a@example.com", "Again")).await;
        assert!(duplicate.unwrap_err().is_already_exists());

        let fetched = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.role, UserRole::Admin);

        let promoted = store
            .set_user_role("b@example.com", UserRole::Admin)
            .await
            .unwrap()
            .unwrap();
        assert!(promoted.is_admin());
        assert!(store
            .set_user_role("nobody@example.com", UserRole::Admin)
            .await
            .unwrap()
            .is_none());

        assert_eq!(store.delete_user(user.id).await.unwrap(), 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_doctor_pair_is_unique() {
        let store = memory_store().await;

        let doctor = store
            .create_doctor(Doctor::new("Dr. Who", "who@example.com", "Braces").with_image("x.png"))
            .await
            .unwrap();
        let duplicate = store
            .create_doctor(Doctor::new("Dr. Who", "who@example.com", "Braces"))
            .await;
        assert!(duplicate.unwrap_err().is_already_exists());

        let found = store
            .find_doctor("who@example.com", "Braces")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.image.as_deref(), Some("x.png"));

        assert_eq!(store.delete_doctor(doctor.id).await.unwrap(), 1);
        assert!(store.list_doctors().await.unwrap().is_empty());
    }
}

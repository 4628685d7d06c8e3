//! Doctor directory.

use std::sync::Arc;

use api_protocol::{
    requests::CreateDoctorRequest,
    responses::{DeleteResult, InsertResult},
};
use booking_store::BookingStore;
use entities::Doctor;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Maintains the list of doctors, unique per (email, speciality).
pub struct DoctorDirectory<S: BookingStore> {
    store: Arc<S>,
}

impl<S: BookingStore> DoctorDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds a doctor. The `?email=` query value wins over the body email.
    pub async fn add(
        &self,
        request: CreateDoctorRequest,
        query_email: Option<String>,
    ) -> ServerResult<InsertResult> {
        let email = query_email
            .or(request.email)
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| ServerError::InvalidRequest("email is required".to_string()))?;

        let duplicate = format!(
            "{} already set in doctors list with {} speciality",
            request.name, request.speciality
        );

        if self.store.find_doctor(&email, &request.speciality).await?.is_some() {
            return Ok(InsertResult::rejected(duplicate));
        }

        let mut doctor = Doctor::new(request.name, email, request.speciality);
        doctor.image = request.image;

        match self.store.create_doctor(doctor).await {
            Ok(doctor) => {
                tracing::info!(doctor_id = %doctor.id, speciality = %doctor.speciality, "Doctor added");
                Ok(InsertResult::inserted(doctor.id))
            }
            Err(e) if e.is_already_exists() => Ok(InsertResult::rejected(duplicate)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self) -> ServerResult<Vec<Doctor>> {
        Ok(self.store.list_doctors().await?)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> ServerResult<DeleteResult> {
        let deleted = self.store.delete_doctor(id).await?;
        tracing::info!(doctor_id = %id, deleted, "Doctor deleted");
        Ok(DeleteResult::new(deleted))
    }
}

#[cfg(test)]
mod tests {
    use booking_store::MemoryBookingStore;

    use super::*;

    fn request(email: Option<&str>) -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: "Dr. Who".to_string(),
            email: email.map(str::to_string),
            speciality: "Braces".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_reject_duplicate() {
        let directory = DoctorDirectory::new(Arc::new(MemoryBookingStore::new()));

        let first = directory.add(request(Some("who@example.com")), None).await.unwrap();
        let second = directory.add(request(None), Some("who@example.com".to_string())).await.unwrap();

        assert!(first.acknowledged);
        assert!(!second.acknowledged);
        assert_eq!(
            second.message.as_deref(),
            Some("Dr. Who already set in doctors list with Braces speciality")
        );
        assert_eq!(directory.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_email_wins() {
        let directory = DoctorDirectory::new(Arc::new(MemoryBookingStore::new()));

        directory
            .add(request(Some("body@example.com")), Some("query@example.com".to_string()))
            .await
            .unwrap();

        assert_eq!(directory.list().await.unwrap()[0].email, "query@example.com");
    }

    #[tokio::test]
    async fn test_missing_email_is_invalid() {
        let directory = DoctorDirectory::new(Arc::new(MemoryBookingStore::new()));

        assert!(matches!(
            directory.add(request(None), None).await,
            Err(ServerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let directory = DoctorDirectory::new(Arc::new(MemoryBookingStore::new()));
        let inserted = directory.add(request(Some("who@example.com")), None).await.unwrap();
        let id = inserted.inserted_id.unwrap();

        assert_eq!(directory.delete_by_id(id).await.unwrap().deleted_count, 1);
        assert_eq!(directory.delete_by_id(id).await.unwrap().deleted_count, 0);
    }
}

//! Doctor directory entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor listed in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Treatment speciality.
    pub speciality: String,
    /// Profile image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Creates a new doctor entry.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        speciality: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            speciality: speciality.into(),
            image: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

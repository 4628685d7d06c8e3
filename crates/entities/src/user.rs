//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role-based access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserRole {
    /// Regular patient account.
    #[default]
    Regular,
    /// Administrator.
    Admin,
}

impl UserRole {
    /// Checks if this role has admin privileges.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Converts the role to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Admin => "Admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Regular" => Some(Self::Regular),
            "Admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Email address, the identity key.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Access role.
    #[serde(default)]
    pub role: UserRole,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new regular user.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            role: UserRole::default(),
            created_at: Utc::now(),
        }
    }

    /// Sets the role.
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Checks if the user can perform admin actions.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("test@example.com", "Test User");

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.name, "Test User");
        assert_eq!(user.role, UserRole::Regular);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_user_role() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Regular.is_admin());
        assert_eq!(UserRole::parse("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::Admin.as_str(), "Admin");
    }

    #[test]
    fn test_missing_role_is_regular() {
        let user: User = serde_json::from_str(
            r#"{"_id":"6f1c1c56-2f43-4b68-9d5c-3c0c5f0b7a11","email":"a@b.c","name":"A","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(user.role, UserRole::Regular);
    }
}

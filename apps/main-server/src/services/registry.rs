//! User registry: registration, sign-in and roles.

use std::sync::Arc;

use api_protocol::responses::{DeleteResult, UpdateResult};
use auth::JwtManager;
use booking_store::BookingStore;
use entities::{User, UserRole};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Result of `register_or_sign_in`.
#[derive(Debug, Clone)]
pub struct SignIn {
    /// Freshly issued identity token.
    pub token: String,
    /// True if the email was registered before this call.
    pub already_registered: bool,
    /// The stored user.
    pub user: User,
}

/// Registers users and issues identity tokens.
pub struct UserRegistry<S: BookingStore> {
    store: Arc<S>,
    jwt: JwtManager,
}

impl<S: BookingStore> UserRegistry<S> {
    /// Creates a registry over the given store.
    pub fn new(store: Arc<S>, jwt: JwtManager) -> Self {
        Self { store, jwt }
    }

    /// Registers `email` or signs it in if already known.
    ///
    /// The first user ever registered becomes an admin. Calling this again
    /// for the same email issues a new token and writes nothing.
    pub async fn register_or_sign_in(&self, email: &str, name: &str) -> ServerResult<SignIn> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ServerError::InvalidRequest("email is required".to_string()));
        }

        if let Some(user) = self.store.get_user_by_email(email).await? {
            return self.sign_in(user);
        }

        // Check-then-insert: two concurrent first registrations may both
        // observe an empty store and both become admin.
        let role = if self.store.count_users().await? == 0 {
            UserRole::Admin
        } else {
            UserRole::Regular
        };

        match self.store.create_user(User::new(email, name).with_role(role)).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "User registered");
                let token = self.issue_token(&user.email)?;
                Ok(SignIn {
                    token,
                    already_registered: false,
                    user,
                })
            }
            Err(e) if e.is_already_exists() => {
                let user = self
                    .store
                    .get_user_by_email(email)
                    .await?
                    .ok_or_else(|| ServerError::Internal(format!("user {email} vanished")))?;
                self.sign_in(user)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn issue_token(&self, email: &str) -> ServerResult<String> {
        self.jwt
            .generate_token(email)
            .map_err(|e| ServerError::Internal(format!("failed to sign token: {e}")))
    }

    fn sign_in(&self, user: User) -> ServerResult<SignIn> {
        let token = self.issue_token(&user.email)?;
        tracing::info!(email = %user.email, "welcome back! {}", user.name);
        Ok(SignIn {
            token,
            already_registered: true,
            user,
        })
    }

    /// Grants the admin role to an existing user.
    pub async fn promote(&self, email: &str) -> ServerResult<UpdateResult> {
        let existing = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("No user registered with {email}")))?;

        let modified = if existing.is_admin() {
            0
        } else {
            self.store.set_user_role(email, UserRole::Admin).await?;
            tracing::info!(email = %email, "User promoted to admin");
            1
        };

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: modified,
        })
    }

    /// Lists all users.
    pub async fn list_all(&self) -> ServerResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Gets a user by email.
    pub async fn get_by_email(&self, email: &str) -> ServerResult<User> {
        self.store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
    }

    /// Returns true if `email` belongs to an admin.
    pub async fn is_admin(&self, email: &str) -> ServerResult<bool> {
        Ok(self
            .store
            .get_user_by_email(email)
            .await?
            .is_some_and(|user| user.is_admin()))
    }

    /// Deletes a user. Users may delete themselves; admins may delete anyone.
    pub async fn delete_by_id(&self, id: Uuid, requester_email: &str) -> ServerResult<DeleteResult> {
        let Some(user) = self.store.get_user(id).await? else {
            return Ok(DeleteResult::new(0));
        };

        if user.email != requester_email && !self.is_admin(requester_email).await? {
            tracing::warn!(user_id = %id, email = %requester_email, "Refused to delete another user");
            return Err(ServerError::PermissionDenied(
                "You can only delete your own account".to_string(),
            ));
        }

        let deleted = self.store.delete_user(id).await?;
        tracing::info!(user_id = %id, deleted, "User deleted");

        Ok(DeleteResult::new(deleted))
    }
}

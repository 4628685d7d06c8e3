//! JWT token generation and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthError, AuthResult, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER};

/// JWT claims for portal identity tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the identified user.
    #[serde(rename = "userEmail")]
    pub user_email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// JWT ID.
    pub jti: String,
}

impl Claims {
    /// Creates new claims for a user.
    pub fn new(user_email: impl Into<String>, issuer: &str, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            user_email: user_email.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Returns true if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token expiration in hours.
    pub expiration_hours: u64,
    /// Token issuer.
    pub issuer: String,
}

impl JwtConfig {
    /// Creates a new JWT configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
        }
    }

    /// Sets the expiration time in hours.
    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.expiration_hours = hours;
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// Issues and verifies identity tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a new JWT manager.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an identity token for the given email.
    pub fn generate_token(&self, user_email: &str) -> AuthResult<String> {
        let claims = Claims::new(user_email, &self.config.issuer, self.config.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtEncoding(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// Fails on a bad signature, a malformed token, a foreign issuer or an
    /// expired `exp` claim.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                AuthError::from(e)
            })?;

        Ok(token_data.claims)
    }

    /// Returns the expiration time in seconds.
    pub fn expiration_seconds(&self) -> u64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-must-be-long-enough-for-security";

    #[test]
    fn test_jwt_generation_and_validation() {
        let manager = JwtManager::new(JwtConfig::new(SECRET));

        let token = manager.generate_token("test@example.com").unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.user_email, "test@example.com");
        assert_eq!(claims.iss, DEFAULT_JWT_ISSUER);
        assert!(!claims.is_expired());
        assert_eq!(manager.expiration_seconds(), 24 * 3600);
    }

    #[test]
    fn test_claim_is_named_user_email_on_the_wire() {
        let claims = Claims::new("test@example.com", DEFAULT_JWT_ISSUER, 1);
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["userEmail"], "test@example.com");
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new(JwtConfig::new(SECRET));

        let result = manager.validate_token("invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-must-be-long-enough"));
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-must-be-long-enough"));

        let token = manager1.generate_token("test@example.com").unwrap();

        let result = manager2.validate_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(JwtConfig::new(SECRET));
        let now = Utc::now();
        let claims = Claims {
            user_email: "test@example.com".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            iss: DEFAULT_JWT_ISSUER.to_string(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = manager.validate_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let issuer_a = JwtManager::new(JwtConfig::new(SECRET).with_issuer("someone-else"));
        let issuer_b = JwtManager::new(JwtConfig::new(SECRET));

        let token = issuer_a.generate_token("test@example.com").unwrap();
        assert!(issuer_b.validate_token(&token).is_err());
    }
}

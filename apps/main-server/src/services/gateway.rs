//! Payment gateway client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServerError;

/// Default Stripe API base URL.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// A payment intent created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    /// Secret the client uses to complete the payment.
    pub client_secret: String,
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<GatewayError> for ServerError {
    fn from(err: GatewayError) -> Self {
        ServerError::PaymentGateway(err.to_string())
    }
}

/// External payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount_minor` units of `currency`.
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: String,
}

/// Stripe implementation of [`PaymentGateway`].
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl StripeGateway {
    /// Creates a client for the public Stripe API.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    /// Creates a client against a custom base URL.
    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        payment_method_types: &[&str],
    ) -> Result<PaymentIntent, GatewayError> {
        let mut form = vec![
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
        ];
        form.extend(
            payment_method_types
                .iter()
                .map(|method| ("payment_method_types[]", method.to_string())),
        );

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<StripeErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            tracing::warn!(status = status.as_u16(), %message, "Payment intent rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        tracing::debug!(amount_minor, currency, "Payment intent created");

        Ok(intent)
    }
}

//! Server configuration.

use std::env;
use std::path::PathBuf;

/// Default bind port, matching the port portal clients expect.
pub const DEFAULT_PORT: u16 = 5000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Secret used to sign identity tokens.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Stripe secret key. Payment intents are unavailable without it.
    pub stripe_secret_key: Option<String>,
    /// Currency code used for every payment intent.
    pub payment_currency: String,
    /// JSON file with treatment options to seed at startup.
    pub catalog_file: Option<PathBuf>,
    /// Log level.
    pub log_level: String,
    /// Log format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field(
                "stripe_secret_key",
                &self.stripe_secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("payment_currency", &self.payment_currency)
            .field("catalog_file", &self.catalog_file)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("PORTAL_JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| anyhow::anyhow!("PORTAL_JWT_SECRET is required"))?;

        let port = match lookup("PORTAL_SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORTAL_SERVER_PORT is not a valid port: {port}"))?,
            None => DEFAULT_PORT,
        };

        let jwt_expiration_hours = match lookup("PORTAL_JWT_EXPIRATION_HOURS") {
            Some(hours) => hours.parse().map_err(|_| {
                anyhow::anyhow!("PORTAL_JWT_EXPIRATION_HOURS is not a number: {hours}")
            })?,
            None => auth::DEFAULT_JWT_EXPIRATION_HOURS,
        };

        let log_format = match lookup("PORTAL_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("PORTAL_LOG_FORMAT must be text or json, got {other}"),
        };

        Ok(Self {
            host: lookup("PORTAL_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            jwt_secret,
            jwt_expiration_hours,
            stripe_secret_key: lookup("STRIPE_SECRET_KEY").filter(|key| !key.is_empty()),
            payment_currency: lookup("PORTAL_PAYMENT_CURRENCY")
                .unwrap_or_else(|| "usd".to_string())
                .to_lowercase(),
            catalog_file: lookup("PORTAL_CATALOG_FILE").map(PathBuf::from),
            log_level: lookup("PORTAL_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if a payment gateway is configured.
    pub fn payments_configured(&self) -> bool {
        self.stripe_secret_key.is_some()
    }
}

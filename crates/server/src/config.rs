//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `GEOCODING_API_KEY` - Google Geocoding API key
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5001)
//! - `GEOCODING_BASE_URL` - Geocoding API origin (default: <https://maps.googleapis.com>)
//! - `FRONTEND_URL` - Public frontend URL used for payment redirects
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: `FRONTEND_URL`)
//! - `STRIPE_SECRET_KEY` - Enables payment sessions when set
//! - `STRIPE_API_BASE` - Stripe API origin (default: <https://api.stripe.com>)
//! - `STRIPE_CURRENCY` - ISO currency for line items (default: cad)
//! - `AWS_BUCKET_NAME`, `AWS_REGION`, `AWS_ACCESS_KEY`, `AWS_SECRET_KEY` -
//!   Enables image uploads when the bucket is set (then all four are required)
//! - `FIREBASE_API_KEY`, `FIREBASE_AUTH_DOMAIN`, `FIREBASE_PROJECT_ID`,
//!   `FIREBASE_STORAGE_BUCKET`, `FIREBASE_MESSAGING_SENDER_ID`,
//!   `FIREBASE_APP_ID`, `FIREBASE_MEASUREMENT_ID` - Public client config
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_FRONTEND_URL: &str = "https://rolla-frontend.vercel.app";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the browser frontend
    pub frontend_url: String,
    /// Origins allowed to call the API from a browser
    pub cors_allowed_origins: Vec<String>,
    /// Address geocoding configuration
    pub geocoding: GeocodingConfig,
    /// Payment processor configuration (payments disabled when `None`)
    pub stripe: Option<StripeConfig>,
    /// Object storage configuration (uploads disabled when `None`)
    pub object_storage: Option<ObjectStorageConfig>,
    /// Public client credentials exposed at `/api/config`
    pub firebase: FirebaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Google Geocoding API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct GeocodingConfig {
    /// API origin, overridable for tests
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: SecretString,
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Stripe Checkout configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// API origin, overridable for tests
    pub api_base: String,
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// Lowercase ISO 4217 code for line items
    pub currency: String,
    /// Redirect target after a successful payment
    pub success_url: String,
    /// Redirect target after an abandoned payment
    pub cancel_url: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

/// S3 bucket configuration for uploaded artwork.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ObjectStorageConfig {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl std::fmt::Debug for ObjectStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorageConfig")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Firebase web client configuration.
///
/// These values ship in the browser bundle, so they are plain strings and
/// serialize directly into the API response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "5001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let frontend_url = trim_trailing_slash(&get_env_or_default(
            "FRONTEND_URL",
            DEFAULT_FRONTEND_URL,
        ));
        let cors_allowed_origins = get_optional_env("CORS_ALLOWED_ORIGINS").map_or_else(
            || vec![frontend_url.clone()],
            |raw| parse_origin_list(&raw),
        );

        let geocoding = GeocodingConfig::from_env()?;
        let stripe = StripeConfig::from_env(&frontend_url)?;
        let object_storage = ObjectStorageConfig::from_env()?;
        let firebase = FirebaseConfig::from_env();

        Ok(Self {
            database_url,
            host,
            port,
            frontend_url,
            cors_allowed_origins,
            geocoding,
            stripe,
            object_storage,
            firebase,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GeocodingConfig {
    /// Load the geocoding section on its own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API key is missing or looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(Self {
            base_url: trim_trailing_slash(&get_env_or_default(
                "GEOCODING_BASE_URL",
                "https://maps.googleapis.com",
            )),
            api_key: get_validated_secret("GEOCODING_API_KEY")?,
        })
    }
}

impl StripeConfig {
    fn from_env(frontend_url: &str) -> Result<Option<Self>, ConfigError> {
        if get_optional_env("STRIPE_SECRET_KEY").is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            api_base: trim_trailing_slash(&get_env_or_default(
                "STRIPE_API_BASE",
                "https://api.stripe.com",
            )),
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            currency: get_env_or_default("STRIPE_CURRENCY", "cad").to_lowercase(),
            success_url: format!("{frontend_url}/success"),
            cancel_url: format!("{frontend_url}/canceled"),
        }))
    }
}

impl ObjectStorageConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(bucket) = get_optional_env("AWS_BUCKET_NAME") else {
            return Ok(None);
        };

        Ok(Some(Self {
            region: get_required_env("AWS_REGION")?,
            bucket,
            access_key_id: get_required_env("AWS_ACCESS_KEY")?,
            secret_access_key: get_validated_secret("AWS_SECRET_KEY")?,
        }))
    }
}

impl FirebaseConfig {
    fn from_env() -> Self {
        Self {
            api_key: get_optional_env("FIREBASE_API_KEY"),
            auth_domain: get_optional_env("FIREBASE_AUTH_DOMAIN"),
            project_id: get_optional_env("FIREBASE_PROJECT_ID"),
            storage_bucket: get_optional_env("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: get_optional_env("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: get_optional_env("FIREBASE_APP_ID"),
            measurement_id: get_optional_env("FIREBASE_MEASUREMENT_ID"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(trim_trailing_slash)
        .collect()
}

fn trim_trailing_slash(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

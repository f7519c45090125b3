//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DUKA_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `DUKA_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Required when `DUKA_SMS_MODE=live`
//! - `AFRICASTALKING_USERNAME` - Africa's Talking account username
//! - `AFRICASTALKING_API_KEY` - Africa's Talking API key
//!
//! ## Optional
//! - `DUKA_HOST` - Bind address (default: 127.0.0.1)
//! - `DUKA_PORT` - Listen port (default: 8000)
//! - `DUKA_SMS_MODE` - `live` or `mock` (default: mock)
//! - `AFRICASTALKING_SENDER_ID` - Alphanumeric sender ID
//! - `DUKA_SMS_API_URL` - Override the messaging endpoint (staging/tests)
//! - `DUKA_ACCESS_TTL_SECS` - Access token lifetime (default: 900)
//! - `DUKA_REFRESH_TTL_SECS` - Refresh token lifetime (default: 604800)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing configuration
    pub jwt: JwtConfig,
    /// SMS notifier configuration
    pub sms: SmsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// JWT signing configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret for access and refresh tokens
    pub secret: SecretString,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

/// Which SMS transport the process uses.
///
/// Selected once at startup; never re-initialized per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsMode {
    /// Call the Africa's Talking messaging API.
    Live,
    /// Record the call and report `mocked` without sending anything.
    Mock,
}

/// SMS notifier configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SmsConfig {
    /// Transport mode
    pub mode: SmsMode,
    /// Africa's Talking account username
    pub username: String,
    /// Africa's Talking API key
    pub api_key: SecretString,
    /// Optional alphanumeric sender ID
    pub sender_id: Option<String>,
    /// Override for the messaging endpoint; defaults to the provider URL
    /// matching the account (sandbox or production)
    pub api_url: Option<String>,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("mode", &self.mode)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("sender_id", &self.sender_id)
            .finish()
    }
}

impl ApiConfig {
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

        let database_url = get_database_url("DUKA_DATABASE_URL")?;
        let host = get_env_or_default("DUKA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DUKA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DUKA_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DUKA_PORT".to_string(), e.to_string()))?;

        let jwt = JwtConfig::from_env()?;
        let sms = SmsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            sms,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("DUKA_JWT_SECRET")?;
        validate_secret_length(&secret, "DUKA_JWT_SECRET")?;

        let access_ttl_secs = get_ttl("DUKA_ACCESS_TTL_SECS", 900)?;
        let refresh_ttl_secs = get_ttl("DUKA_REFRESH_TTL_SECS", 604_800)?;

        Ok(Self {
            secret,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }
}

impl SmsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mode = match get_env_or_default("DUKA_SMS_MODE", "mock").as_str() {
            "live" => SmsMode::Live,
            "mock" => SmsMode::Mock,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "DUKA_SMS_MODE".to_string(),
                    format!("expected 'live' or 'mock', got '{other}'"),
                ));
            }
        };

        // Provider credentials only matter in live mode; mock runs with
        // whatever happens to be set.
        let (username, api_key) = match mode {
            SmsMode::Live => (
                get_required_env("AFRICASTALKING_USERNAME")?,
                get_validated_secret("AFRICASTALKING_API_KEY")?,
            ),
            SmsMode::Mock => (
                get_env_or_default("AFRICASTALKING_USERNAME", "sandbox"),
                SecretString::from(get_env_or_default("AFRICASTALKING_API_KEY", "")),
            ),
        };

        Ok(Self {
            mode,
            username,
            api_key,
            sender_id: get_optional_env("AFRICASTALKING_SENDER_ID"),
            api_url: get_optional_env("DUKA_SMS_API_URL"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a token TTL from the environment, with a default.
fn get_ttl(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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

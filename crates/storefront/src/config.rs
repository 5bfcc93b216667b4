//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `CART_SERVICE_URL` - Base URL of the user/cart service
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CART_SERVICE_API_KEY` - Service API key sent as `X-Api-Key`
//! - `CART_SERVICE_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `REVIEW_SUBMIT_LATENCY_MS` - Simulated review acceptance latency (default: 1500)
//! - `TOAST_DISMISS_MS` - Toast auto-dismiss delay (default: 5000)
//! - `TOAST_QUEUE_CAPACITY` - Maximum queued toasts (default: 5)
//! - `LOCAL_CART_IDLE_SECS` - Idle lifetime of anonymous carts and visitor
//!   preferences (default: 7 days)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// User/cart service configuration
    pub cart_service: CartServiceConfig,
    /// Workflow timing and queue sizes
    pub workflows: WorkflowConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// User/cart service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CartServiceConfig {
    /// Base URL of the service
    pub base_url: Url,
    /// Service API key (server-side only)
    pub api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for CartServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartServiceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Workflow timing and queue configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Simulated latency before a review is accepted
    pub review_submit_latency: Duration,
    /// How long a toast stays visible
    pub toast_dismiss_after: Duration,
    /// Maximum number of toasts queued at once
    pub toast_queue_capacity: usize,
    /// Idle lifetime of an anonymous session cart and of visitor preferences
    pub local_cart_idle: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            review_submit_latency: Duration::from_millis(1500),
            toast_dismiss_after: Duration::from_millis(5000),
            toast_queue_capacity: 5,
            local_cart_idle: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl StorefrontConfig {
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
        Self::from_vars(&EnvVars)
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` under the same conditions as [`Self::from_env`].
    pub fn from_vars(vars: &impl VarSource) -> Result<Self, ConfigError> {
        let host = parse_or_default(vars, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_or_default(vars, "STOREFRONT_PORT", "3000")?;
        let base_url = get_required(vars, "STOREFRONT_BASE_URL")?;

        let cart_service = CartServiceConfig::from_vars(vars)?;
        let workflows = WorkflowConfig::from_vars(vars)?;

        Ok(Self {
            host,
            port,
            base_url,
            cart_service,
            workflows,
            sentry_dsn: vars.get("SENTRY_DSN"),
            sentry_environment: vars.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_or_default(vars, "SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_or_default(vars, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CartServiceConfig {
    fn from_vars(vars: &impl VarSource) -> Result<Self, ConfigError> {
        let raw_url = get_required(vars, "CART_SERVICE_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CART_SERVICE_URL".to_string(), e.to_string())
        })?;

        let api_key = match vars.get("CART_SERVICE_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "CART_SERVICE_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let timeout_secs: u64 = parse_or_default(vars, "CART_SERVICE_TIMEOUT_SECS", "10")?;

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl WorkflowConfig {
    fn from_vars(vars: &impl VarSource) -> Result<Self, ConfigError> {
        let latency_ms: u64 = parse_or_default(vars, "REVIEW_SUBMIT_LATENCY_MS", "1500")?;
        let dismiss_ms: u64 = parse_or_default(vars, "TOAST_DISMISS_MS", "5000")?;
        let capacity: usize = parse_or_default(vars, "TOAST_QUEUE_CAPACITY", "5")?;
        if capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TOAST_QUEUE_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let idle_secs: u64 = parse_or_default(vars, "LOCAL_CART_IDLE_SECS", "604800")?;

        Ok(Self {
            review_submit_latency: Duration::from_millis(latency_ms),
            toast_dismiss_after: Duration::from_millis(dismiss_ms),
            toast_queue_capacity: capacity,
            local_cart_idle: Duration::from_secs(idle_secs),
        })
    }
}

// =============================================================================
// Variable Sources
// =============================================================================

/// A source of configuration variables.
pub trait VarSource {
    /// Look up a variable by name.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads variables from the process environment.
pub struct EnvVars;

impl VarSource for EnvVars {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        Self::get(self, key).cloned()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required(vars: &impl VarSource, key: &str) -> Result<String, ConfigError> {
    vars.get(key)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse a variable, falling back to a default when it is unset.
fn parse_or_default<T>(vars: &impl VarSource, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    vars.get(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("CART_SERVICE_URL", "http://localhost:4000/api/"),
        ]
    }

    #[test]
    fn test_defaults_with_required_vars() {
        let config = StorefrontConfig::from_vars(&vars(&required())).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.cart_service.timeout, Duration::from_secs(10));
        assert!(config.cart_service.api_key.is_none());
        assert_eq!(
            config.workflows.review_submit_latency,
            Duration::from_millis(1500)
        );
        assert_eq!(config.workflows.toast_queue_capacity, 5);
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_cart_service_url() {
        let result = StorefrontConfig::from_vars(&vars(&[(
            "STOREFRONT_BASE_URL",
            "http://localhost:3000",
        )]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "CART_SERVICE_URL"));
    }

    #[test]
    fn test_invalid_cart_service_url() {
        let result = StorefrontConfig::from_vars(&vars(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("CART_SERVICE_URL", "not a url"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = required();
        pairs.push(("STOREFRONT_PORT", "eighty"));
        let result = StorefrontConfig::from_vars(&vars(&pairs));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_zero_toast_capacity_rejected() {
        let mut pairs = required();
        pairs.push(("TOAST_QUEUE_CAPACITY", "0"));
        assert!(StorefrontConfig::from_vars(&vars(&pairs)).is_err());
    }

    #[test]
    fn test_placeholder_api_key_rejected() {
        let mut pairs = required();
        pairs.push(("CART_SERVICE_API_KEY", "your-api-key-here"));
        let result = StorefrontConfig::from_vars(&vars(&pairs));
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_strong_api_key_accepted() {
        let mut pairs = required();
        pairs.push(("CART_SERVICE_API_KEY", "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"));
        let config = StorefrontConfig::from_vars(&vars(&pairs)).unwrap();
        assert!(config.cart_service.api_key.is_some());
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_cart_service_debug_redacts_key() {
        let config = CartServiceConfig {
            base_url: Url::parse("http://localhost:4000").unwrap(),
            api_key: Some(SecretString::from("super_secret_service_key")),
            timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:4000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
    }
}

//! Backend connection settings loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_BASE_URL` - Base URL of the marketplace backend
//!
//! ## Optional
//! - `BAZAAR_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Product cache time-to-live (default: 300)
//! - `BAZAAR_API_TOKEN` - Service bearer token for back-office tools
//!
//! The `get_*` helpers are shared with the storefront and admin configs.

use std::collections::HashMap;
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

/// Marketplace backend configuration.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product list/detail responses stay cached
    pub cache_ttl: Duration,
    /// Bearer token used until a customer logs in
    pub service_token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ApiConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

    /// Config with default timeout and cache TTL and no service token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(Self::DEFAULT_CACHE_TTL_SECS),
            service_token: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or malformed, a
    /// duration is not a whole number of seconds, or the service token fails
    /// validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("BAZAAR_API_BASE_URL")?)?;
        let timeout = Duration::from_secs(get_parsed_env(
            "BAZAAR_API_TIMEOUT_SECS",
            Self::DEFAULT_TIMEOUT_SECS,
        )?);
        let cache_ttl = Duration::from_secs(get_parsed_env(
            "BAZAAR_CATALOG_CACHE_TTL_SECS",
            Self::DEFAULT_CACHE_TTL_SECS,
        )?);
        let service_token = get_optional_secret("BAZAAR_API_TOKEN")?;

        Ok(Self {
            base_url,
            timeout,
            cache_ttl,
            service_token,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_API_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "BAZAAR_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is unset.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is set but does not parse.
pub fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Load and validate an optional secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the value is set but looks like a
/// placeholder or has too little entropy.
pub fn get_optional_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_placeholder_tokens_rejected() {
        for token in ["your-api-token", "changeme123", "XXXXXXXXXXXXXXXX"] {
            let err = validate_secret_strength(token, "BAZAAR_API_TOKEN").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{token}");
        }
    }

    #[test]
    fn test_low_entropy_token_rejected() {
        let err = validate_secret_strength(&"ab".repeat(20), "BAZAAR_API_TOKEN").unwrap_err();
        assert!(err.to_string().contains("entropy too low"));
    }

    #[test]
    fn test_random_token_accepted() {
        assert!(validate_secret_strength("q8Zr2LmP0vX7tKs4Nw9Hb1Jc6Yd3Fg5A", "BAZAAR_API_TOKEN").is_ok());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("BAZAAR_API_TIMEOUT_SECS", " 45 ").unwrap(), 45);
        let err = parse_value::<u64>("BAZAAR_API_TIMEOUT_SECS", "soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BAZAAR_API_TIMEOUT_SECS"));
    }

    #[test]
    fn test_base_url_must_be_http() {
        assert!(parse_base_url("https://api.bazaar.test/v1/").is_ok());
        assert!(parse_base_url("ftp://api.bazaar.test").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:4000").unwrap());
        config.service_token = Some(SecretString::from("q8Zr2LmP0vX7tKs4Nw9Hb1Jc6Yd3Fg5A"));
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:4000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("q8Zr2LmP"));
    }
}

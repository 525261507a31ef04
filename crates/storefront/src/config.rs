//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_BASE_URL` - Base URL of the marketplace backend
//!
//! ## Optional
//! - `BAZAAR_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Product cache time-to-live (default: 300)
//! - `STOREFRONT_STATE_PATH` - Persisted session file (default: .bazaar/session.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! The storefront never uses a service token; customers authenticate with
//! their own credentials.

use std::path::PathBuf;

use bazaar_api::config::get_env_or_default;
use bazaar_api::telemetry::SentryConfig;
use bazaar_api::{ApiConfig, ConfigError};

pub const DEFAULT_STATE_PATH: &str = ".bazaar/session.json";

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Marketplace backend connection
    pub api: ApiConfig,
    /// Where the session key/value state is persisted
    pub state_path: PathBuf,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut api = ApiConfig::from_env()?;
        api.service_token = None;

        Ok(Self {
            api,
            state_path: PathBuf::from(get_env_or_default("STOREFRONT_STATE_PATH", DEFAULT_STATE_PATH)),
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Config for a backend at `base_url` with defaults everywhere else.
    #[must_use]
    pub fn new(base_url: url::Url) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            sentry: SentryConfig::default(),
        }
    }
}

//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_BASE_URL` - Base URL of the marketplace backend
//!
//! ## Optional
//! - `BAZAAR_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Product cache time-to-live (default: 300)
//! - `BAZAAR_API_TOKEN` - Service bearer token (HIGH PRIVILEGE)
//! - `ADMIN_PAGE_SIZE` - Rows per table page (default: 10)
//! - `ADMIN_STATUS_POLICY` - `enforced` or `permissive` (default: enforced)
//! - `ADMIN_LOW_STOCK_THRESHOLD` - Dashboard low-stock cutoff (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use bazaar_api::config::get_parsed_env;
use bazaar_api::telemetry::SentryConfig;
use bazaar_api::{ApiConfig, ConfigError};
use bazaar_core::catalog::Pager;

use crate::orders::TransitionPolicy;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

/// Admin console configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Marketplace backend connection
    pub api: ApiConfig,
    /// Rows per table page
    pub page_size: usize,
    /// Which order status changes are allowed
    pub status_policy: TransitionPolicy,
    /// Products at or below this stock are flagged on the dashboard
    pub low_stock_threshold: u32,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl AdminConfig {
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

        let page_size: usize = get_parsed_env("ADMIN_PAGE_SIZE", Pager::DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig::from_env()?,
            page_size,
            status_policy: get_parsed_env("ADMIN_STATUS_POLICY", TransitionPolicy::Enforced)?,
            low_stock_threshold: get_parsed_env(
                "ADMIN_LOW_STOCK_THRESHOLD",
                DEFAULT_LOW_STOCK_THRESHOLD,
            )?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Config for a backend at `base_url` with defaults everywhere else.
    #[must_use]
    pub fn new(base_url: url::Url) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            page_size: Pager::DEFAULT_PAGE_SIZE,
            status_policy: TransitionPolicy::Enforced,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            sentry: SentryConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::new(url::Url::parse("http://localhost:4000").unwrap());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.status_policy, TransitionPolicy::Enforced);
        assert_eq!(config.low_stock_threshold, 5);
        assert!(config.sentry.dsn.is_none());
    }
}

//! Bazaar admin library.
//!
//! State and operations behind the marketplace admin console and the vendor
//! portal: product management, the order desk, dashboards and table state.
//!
//! # Security
//!
//! The admin console may run with a service token (`BAZAAR_API_TOKEN`) that
//! grants full catalog and order access. Only deploy it where operators are
//! already authenticated.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod orders;
pub mod products;
pub mod state;
pub mod table;
pub mod vendor;

pub use config::AdminConfig;
pub use error::{AdminError, Result};
pub use orders::TransitionPolicy;
pub use state::Admin;

/// Initialize tracing and Sentry for an admin process.
///
/// Keep the returned guard alive so pending events are flushed on exit.
#[must_use]
pub fn init_telemetry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    bazaar_api::telemetry::init("bazaar_admin=info,bazaar_api=info", &config.sentry)
}

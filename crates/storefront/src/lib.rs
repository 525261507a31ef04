//! Bazaar storefront library.
//!
//! Client-side state for the customer-facing shop: the catalog snapshot and
//! listings, the synchronized cart and wishlist, checkout, and the customer
//! account. Presentation layers hold a [`Storefront`] and call into it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod wishlist;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use state::Storefront;

/// Initialize tracing and Sentry for a storefront process.
///
/// Keep the returned guard alive for the lifetime of the process so pending
/// events are flushed on exit.
#[must_use]
pub fn init_telemetry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    bazaar_api::telemetry::init("bazaar_storefront=info,bazaar_api=info", &config.sentry)
}

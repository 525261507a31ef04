//! Bazaar API - HTTP client for the marketplace backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth; this crate holds no state beyond the
//!   bearer token and a short-lived product cache
//! - In-memory caching via `moka` for product list/detail (TTL from config)
//! - Every call is a single request: no retries, no backoff
//!
//! # Authentication
//!
//! A bearer token is attached to every request except `/auth/login` and
//! `/auth/register`. [`ApiClient::login`] and [`ApiClient::register`] store the
//! token they receive.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_api::{ApiClient, ApiConfig};
//!
//! let client = ApiClient::new(&ApiConfig::from_env()?)?;
//! let products = client.list_products().await?;
//! let cart = client.get_cart(&owner).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod account;
mod cache;
mod cart;
mod client;
pub mod config;
mod error;
mod orders;
mod products;
pub mod telemetry;
mod types;
mod vendor;
mod wishlist;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use types::{ImageUpload, ProfileUpdate, VendorProfileUpdate};

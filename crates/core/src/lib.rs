//! Bazaar Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across all Bazaar
//! components:
//! - `api` - HTTP client for the marketplace backend
//! - `storefront` - Catalog browsing, cart, wishlist, checkout and account
//! - `admin` - Admin console and vendor portal
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here is deterministic and unit-testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, cart, wishlist, orders
//! - [`catalog`] - Product filtering, sorting, pagination and incremental reveal

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;

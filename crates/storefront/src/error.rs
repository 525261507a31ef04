//! Unified error handling with Sentry integration.
//!
//! Every storefront operation returns `Result<T, StorefrontError>`. The
//! presentation layer shows [`StorefrontError::notice`] as a transient message
//! and calls [`StorefrontError::report`] so server-side failures reach Sentry.

use bazaar_api::ApiError;
use bazaar_core::{CartError, ValidationErrors};
use thiserror::Error;

use crate::session::SessionError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Form input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Add-to-cart selection rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persisted session state could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation requires a signed-in customer.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl StorefrontError {
    /// Whether the failure belongs in error tracking.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_error(),
            Self::Session(_) => true,
            Self::Validation(_)
            | Self::Cart(_)
            | Self::NotFound(_)
            | Self::NotLoggedIn
            | Self::EmptyCart => false,
        }
    }

    /// Whether the backend rejected the customer's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized(_)))
    }

    /// Message safe to show the customer.
    ///
    /// Transport and server details are never exposed.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => {
                "We couldn't find what you were looking for.".to_string()
            }
            Self::Api(ApiError::Unauthorized(_)) | Self::NotLoggedIn => {
                "Please sign in to continue.".to_string()
            }
            Self::Api(ApiError::RateLimited(seconds)) => {
                format!("Too many requests. Please try again in {seconds} seconds.")
            }
            Self::Api(ApiError::Status { status, message }) if (400..500).contains(status) => {
                message.clone()
            }
            Self::Api(_) | Self::Session(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Validation(_) => "Please correct the highlighted fields.".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
        }
    }

    /// Capture server-side failures to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            bazaar_api::telemetry::capture(self, "Storefront operation failed");
        }
    }

    /// Field errors to render inline, if this is a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::Validator;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");
        assert_eq!(StorefrontError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_notice_hides_server_details() {
        let err = StorefrontError::Api(ApiError::Status {
            status: 500,
            message: "panic at db.rs:12".to_string(),
        });
        assert!(!err.notice().contains("db.rs"));
        assert!(err.is_server_error());

        let err = StorefrontError::Api(ApiError::Status {
            status: 409,
            message: "Email already registered".to_string(),
        });
        assert_eq!(err.notice(), "Email already registered");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_cart_notice_is_the_rejection_reason() {
        let err = StorefrontError::from(CartError::MissingSize);
        assert_eq!(err.notice(), "please select a size");
    }

    #[test]
    fn test_field_errors() {
        let mut v = Validator::new();
        v.required("city", "");
        let err = StorefrontError::from(v.finish().unwrap_err());
        assert_eq!(err.field_errors().unwrap().for_field("city"), Some("is required"));
        assert!(StorefrontError::NotLoggedIn.field_errors().is_none());
    }
}

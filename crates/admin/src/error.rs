//! Unified error handling for the admin console and vendor portal.

use bazaar_api::ApiError;
use bazaar_core::{StatusTransitionError, ValidationErrors};
use thiserror::Error;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Form input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Status change not allowed under the enforced policy.
    #[error("Transition error: {0}")]
    Transition(#[from] StatusTransitionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource belongs to another vendor.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AdminError {
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_error(),
            Self::Validation(_) | Self::Transition(_) | Self::NotFound(_) | Self::Forbidden(_) => {
                false
            }
        }
    }

    /// Message safe to show an operator.
    ///
    /// Don't expose transport or server details.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => "Not found.".to_string(),
            Self::Api(ApiError::Unauthorized(_)) => {
                "The backend rejected the admin credentials.".to_string()
            }
            Self::Api(ApiError::RateLimited(seconds)) => {
                format!("Rate limited. Retry in {seconds} seconds.")
            }
            Self::Api(ApiError::Status { status, message }) if (400..500).contains(status) => {
                message.clone()
            }
            Self::Api(_) => "External service error".to_string(),
            Self::Validation(_) => "Please correct the highlighted fields.".to_string(),
            Self::Transition(err) => err.to_string(),
            Self::Forbidden(_) => "You don't have access to that.".to_string(),
        }
    }

    /// Log server errors with Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            bazaar_api::telemetry::capture(self, "Admin operation failed");
        }
    }

    #[must_use]
    pub const fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::OrderStatus;

    #[test]
    fn test_transition_notice_names_both_statuses() {
        let err = AdminError::from(StatusTransitionError {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        });
        assert_eq!(err.notice(), "cannot move an order from delivered to pending");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_server_errors_are_hidden() {
        let err = AdminError::Api(ApiError::Status {
            status: 502,
            message: "upstream connect error".to_string(),
        });
        assert_eq!(err.notice(), "External service error");
        assert!(err.is_server_error());
    }
}

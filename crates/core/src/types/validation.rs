//! Field-level form validation.
//!
//! Forms are validated in full before any request is sent; every failing field
//! is reported so the UI can show all messages inline at once.

use core::fmt;

use serde::Serialize;

use super::email::Email;
use super::price::Price;

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors from validating a form. Never empty when returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid form ({joined})")
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// First message for a field, for rendering next to the input.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.for_field(field).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accumulates field errors while a form is checked.
///
/// ```
/// use bazaar_core::Validator;
///
/// let mut v = Validator::new();
/// let name = v.min_len("name", " Al ", 3);
/// let email = v.email("email", "al@example.com");
/// let err = v.finish().unwrap_err();
/// assert!(err.has("name"));
/// assert!(!err.has("email"));
/// assert!(name.is_none() && email.is_some());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arbitrary error.
    pub fn reject(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Require a non-blank value; returns it trimmed.
    pub fn required(&mut self, field: &'static str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, "is required");
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Require at least `min` characters after trimming.
    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, "is required");
            None
        } else if trimmed.chars().count() < min {
            self.reject(field, format!("must be at least {min} characters"));
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> Option<Email> {
        match Email::parse(value) {
            Ok(email) => Some(email),
            Err(e) => {
                self.reject(field, e.to_string());
                None
            }
        }
    }

    /// Require a price strictly greater than zero.
    pub fn positive_price(&mut self, field: &'static str, value: &str) -> Option<Price> {
        match Price::parse(value) {
            Ok(price) if price.amount().is_zero() => {
                self.reject(field, "must be greater than zero");
                None
            }
            Ok(price) => Some(price),
            Err(e) => {
                self.reject(field, e.to_string());
                None
            }
        }
    }

    /// Optional price: blank means `Some(None)`, invalid means `None`.
    pub fn optional_price(&mut self, field: &'static str, value: &str) -> Option<Option<Price>> {
        if value.trim().is_empty() {
            return Some(None);
        }
        match Price::parse(value) {
            Ok(price) => Some(Some(price)),
            Err(e) => {
                self.reject(field, e.to_string());
                None
            }
        }
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns every recorded field error.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

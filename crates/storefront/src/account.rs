//! Customer login, registration, profile and order history.

use bazaar_api::ProfileUpdate;
use bazaar_api::telemetry::add_breadcrumb;
use bazaar_core::{
    CustomerProfile, Email, Order, Owner, ShippingAddress, ValidationErrors, Validator,
};
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::error::{Result, StorefrontError};
use crate::state::Storefront;

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;

#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> std::result::Result<(Email, SecretString), ValidationErrors> {
        let mut v = Validator::new();
        let email = v.email("email", &self.email);
        let password = password_field(&mut v, "password", &self.password);
        match (email, password) {
            (Some(email), Some(password)) => {
                v.finish()?;
                Ok((email, password))
            }
            _ => Err(v.finish().err().unwrap_or_default()),
        }
    }
}

#[derive(Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A registration that passed validation.
#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every failing field, including a confirmation mismatch.
    pub fn validate(&self) -> std::result::Result<ValidRegistration, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.min_len("name", &self.name, MIN_NAME_LEN);
        let email = v.email("email", &self.email);
        let password = password_field(&mut v, "password", &self.password);
        if self.confirm_password != self.password {
            v.reject("confirm_password", "passwords do not match");
        }
        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => {
                v.finish()?;
                Ok(ValidRegistration {
                    name,
                    email,
                    password,
                })
            }
            _ => Err(v.finish().err().unwrap_or_default()),
        }
    }
}

/// Editable profile fields. The address is optional but must be complete if
/// any part of it is filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ProfileForm {
    #[must_use]
    pub fn for_customer(profile: &CustomerProfile) -> Self {
        let address = profile.address.clone();
        Self {
            name: profile.name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            street: address.as_ref().map(|a| a.street.clone()).unwrap_or_default(),
            city: address.as_ref().map(|a| a.city.clone()).unwrap_or_default(),
            postal_code: address
                .as_ref()
                .map(|a| a.postal_code.clone())
                .unwrap_or_default(),
            country: address.map(|a| a.country).unwrap_or_default(),
        }
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> std::result::Result<ProfileUpdate, ValidationErrors> {
        let mut v = Validator::new();
        let name = v.min_len("name", &self.name, MIN_NAME_LEN);
        let phone = Some(self.phone.trim().to_string()).filter(|p| !p.is_empty());

        let parts = [&self.street, &self.city, &self.postal_code, &self.country];
        let address = if parts.iter().all(|p| p.trim().is_empty()) {
            None
        } else {
            let street = v.required("street", &self.street);
            let city = v.required("city", &self.city);
            let postal_code = v.required("postal_code", &self.postal_code);
            let country = v.required("country", &self.country);
            match (street, city, postal_code, country) {
                (Some(street), Some(city), Some(postal_code), Some(country)) => {
                    Some(ShippingAddress {
                        street,
                        city,
                        postal_code,
                        country,
                    })
                }
                _ => None,
            }
        };

        v.finish()?;
        let Some(name) = name else {
            return Err(ValidationErrors::default());
        };
        Ok(ProfileUpdate {
            name,
            phone,
            address,
        })
    }
}

fn password_field(v: &mut Validator, field: &'static str, value: &str) -> Option<SecretString> {
    if value.is_empty() {
        v.reject(field, "is required");
        None
    } else if value.chars().count() < MIN_PASSWORD_LEN {
        v.reject(field, format!("must be at least {MIN_PASSWORD_LEN} characters"));
        None
    } else {
        Some(SecretString::from(value.to_string()))
    }
}

impl Storefront {
    /// # Errors
    ///
    /// Returns validation errors before any request, or an API error such as
    /// `Unauthorized` for bad credentials.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &LoginForm) -> Result<CustomerProfile> {
        let (email, password) = form.validate()?;
        let profile = self.api().login(&email, &password).await?;
        self.signed_in(profile).await
    }

    /// # Errors
    ///
    /// Returns validation errors before any request, or an API error if the
    /// account cannot be created.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegisterForm) -> Result<CustomerProfile> {
        let valid = form.validate()?;
        let profile = self
            .api()
            .register(&valid.name, &valid.email, &valid.password)
            .await?;
        self.signed_in(profile).await
    }

    /// Drop the token and the customer, then switch back to the anonymous
    /// session's cart and wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session state cannot be persisted.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.api().clear_token().await;
        self.session().mark_logged_out().await?;
        self.set_customer(None).await;
        add_breadcrumb("auth", "Logged out", None);
        info!("Customer logged out");
        self.reload_owned().await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a signed-in customer, validation errors,
    /// or an API error.
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<CustomerProfile> {
        if self.customer().await.is_none() {
            return Err(StorefrontError::NotLoggedIn);
        }
        let update = form.validate()?;
        let profile = self.api().update_profile(&update).await?;
        self.set_customer(Some(profile.clone())).await;
        Ok(profile)
    }

    /// The signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a signed-in customer, or an API error.
    #[instrument(skip(self))]
    pub async fn order_history(&self) -> Result<Vec<Order>> {
        let customer = self.customer().await.ok_or(StorefrontError::NotLoggedIn)?;
        Ok(self.api().list_orders(Some(&Owner::User(customer.id))).await?)
    }

    async fn signed_in(&self, profile: CustomerProfile) -> Result<CustomerProfile> {
        self.session().mark_logged_in(profile.id).await?;
        self.set_customer(Some(profile.clone())).await;
        let user_id = profile.id.to_string();
        add_breadcrumb("auth", "Logged in", Some(&[("user_id", user_id.as_str())]));
        self.reload_owned().await;
        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        let (email, password) = form.validate().unwrap();
        assert_eq!(email.as_str(), "ada@example.com");
        assert_eq!(password.expose_secret(), "correct horse");

        let err = LoginForm {
            email: "nope".to_string(),
            password: "short".to_string(),
        }
        .validate()
        .unwrap_err();
        assert!(err.has("email"));
        assert_eq!(err.for_field("password"), Some("must be at least 8 characters"));
    }

    #[test]
    fn test_login_form_debug_redacts_password() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        assert!(!format!("{form:?}").contains("hunter2"));
    }

    #[test]
    fn test_register_confirmation_must_match() {
        let form = RegisterForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "long enough".to_string(),
            confirm_password: "long enougH".to_string(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.has("confirm_password"));
    }

    #[test]
    fn test_register_short_name() {
        let form = RegisterForm {
            name: " A ".to_string(),
            email: "ada@example.com".to_string(),
            password: "long enough".to_string(),
            confirm_password: "long enough".to_string(),
        };
        assert!(form.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_profile_address_all_or_nothing() {
        let form = ProfileForm {
            name: "Ada".to_string(),
            ..ProfileForm::default()
        };
        let update = form.validate().unwrap();
        assert!(update.address.is_none());
        assert!(update.phone.is_none());

        let form = ProfileForm {
            name: "Ada".to_string(),
            city: "Lisbon".to_string(),
            ..ProfileForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.has("street"));
        assert!(err.has("postal_code"));
        assert!(!err.has("city"));
    }
}

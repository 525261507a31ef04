//! Checkout: contact/shipping form and order placement.

use bazaar_api::telemetry::add_breadcrumb;
use bazaar_core::{
    ContactDetails, CustomerProfile, NewOrder, Order, PaymentMethod, ShippingAddress,
    ValidationErrors, Validator,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Result, StorefrontError};
use crate::state::Storefront;

const MIN_PHONE_DIGITS: usize = 7;

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: String,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub contact: ContactDetails,
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Prefill from the signed-in customer's profile.
    #[must_use]
    pub fn for_customer(profile: &CustomerProfile) -> Self {
        let mut names = profile.name.trim().splitn(2, char::is_whitespace);
        let first_name = names.next().unwrap_or_default().to_string();
        let last_name = names.next().unwrap_or_default().trim().to_string();
        let address = profile.address.clone();

        Self {
            first_name,
            last_name,
            email: profile.email.to_string(),
            phone: profile.phone.clone().unwrap_or_default(),
            street: address.as_ref().map(|a| a.street.clone()).unwrap_or_default(),
            city: address.as_ref().map(|a| a.city.clone()).unwrap_or_default(),
            postal_code: address
                .as_ref()
                .map(|a| a.postal_code.clone())
                .unwrap_or_default(),
            country: address.map(|a| a.country).unwrap_or_default(),
            payment_method: PaymentMethod::default().to_string(),
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(&self) -> std::result::Result<ValidCheckout, ValidationErrors> {
        let mut v = Validator::new();

        let first_name = v.required("first_name", &self.first_name);
        let last_name = v.required("last_name", &self.last_name);
        let email = v.email("email", &self.email);
        let phone = v.required("phone", &self.phone);
        if let Some(phone) = &phone
            && phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS
        {
            v.reject("phone", format!("must contain at least {MIN_PHONE_DIGITS} digits"));
        }
        let street = v.required("street", &self.street);
        let city = v.required("city", &self.city);
        let postal_code = v.required("postal_code", &self.postal_code);
        let country = v.required("country", &self.country);
        let payment_method = self.payment_method.parse::<PaymentMethod>().ok();
        if payment_method.is_none() {
            v.reject("payment_method", "choose a payment method");
        }

        let (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(street),
            Some(city),
            Some(postal_code),
            Some(country),
            Some(payment_method),
        ) = (
            first_name,
            last_name,
            email,
            phone,
            street,
            city,
            postal_code,
            country,
            payment_method,
        )
        else {
            return Err(v.finish().err().unwrap_or_default());
        };
        v.finish()?;

        Ok(ValidCheckout {
            contact: ContactDetails {
                first_name,
                last_name,
                email,
                phone,
            },
            shipping: ShippingAddress {
                street,
                city,
                postal_code,
                country,
            },
            payment_method,
        })
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order: Order,
    /// Show the first-order popup; `true` at most once per session store.
    pub show_first_order_popup: bool,
}

impl Storefront {
    /// Validate the form, place an order for the current cart, then clear
    /// the cart.
    ///
    /// The order is built from a snapshot of the cart taken before submission,
    /// so later cart changes never alter it.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any request, `EmptyCart` for an empty
    /// cart, or an API error if the order is rejected. Once the order is
    /// placed, failures clearing the cart or persisting the popup flag are
    /// logged and do not fail the checkout.
    #[instrument(skip(self, form))]
    pub async fn place_order(&self, form: &CheckoutForm) -> Result<OrderConfirmation> {
        let valid = form.validate()?;

        let snapshot = self.cart().snapshot().await;
        if snapshot.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }

        let customer_id = self.customer().await.map(|c| c.id);
        let new_order = NewOrder::from_cart(
            customer_id,
            valid.contact,
            valid.shipping,
            snapshot.lines(),
            valid.payment_method,
        );

        let order = self.api().create_order(&new_order).await?;
        info!(order_id = %order.id, total = %order.total, "Order placed");
        let order_id = order.id.to_string();
        add_breadcrumb("checkout", "Placed order", Some(&[("order_id", order_id.as_str())]));

        if let Err(e) = self.cart().clear().await {
            warn!(error = %e, order_id = %order.id, "Cart clear failed after order");
        }

        let show_first_order_popup = self
            .session()
            .take_first_order_popup()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not persist first-order popup flag");
                false
            });

        Ok(OrderConfirmation {
            order,
            show_first_order_popup,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{AccountRole, Email, UserId};

    fn filled() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+351 912 345 678".to_string(),
            street: "Rua Augusta 10".to_string(),
            city: "Lisbon".to_string(),
            postal_code: "1100-053".to_string(),
            country: "PT".to_string(),
            payment_method: "card".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let valid = filled().validate().unwrap();
        assert_eq!(valid.contact.full_name(), "Ada Byron");
        assert_eq!(valid.shipping.city, "Lisbon");
        assert_eq!(valid.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_every_bad_field_reported() {
        let form = CheckoutForm {
            email: "ada@".to_string(),
            phone: "12-34".to_string(),
            payment_method: "bitcoin".to_string(),
            ..CheckoutForm::default()
        };
        let err = form.validate().unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "email",
            "phone",
            "street",
            "city",
            "postal_code",
            "country",
            "payment_method",
        ] {
            assert!(err.has(field), "{field}");
        }
        assert_eq!(err.for_field("phone"), Some("must contain at least 7 digits"));
    }

    #[test]
    fn test_prefill_from_profile() {
        let profile = CustomerProfile {
            id: UserId::new(3),
            name: "Grace Brewster Hopper".to_string(),
            email: Email::parse("grace@example.com").unwrap(),
            phone: Some("555 0100 200".to_string()),
            address: Some(ShippingAddress {
                street: "1 Navy Way".to_string(),
                city: "Arlington".to_string(),
                postal_code: "22202".to_string(),
                country: "US".to_string(),
            }),
            role: AccountRole::Customer,
        };
        let form = CheckoutForm::for_customer(&profile);
        assert_eq!(form.first_name, "Grace");
        assert_eq!(form.last_name, "Brewster Hopper");
        assert_eq!(form.payment_method, "cash_on_delivery");
        assert!(form.validate().is_ok());
    }
}

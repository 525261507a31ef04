//! Vendor self-service portal.
//!
//! Vendors manage their store profile and only their own products and orders.
//! Ownership is checked against the vendor-scoped listings before any write.

use bazaar_api::VendorProfileUpdate;
use bazaar_core::{
    Order, OrderId, OrderStatus, Product, ProductId, ValidationErrors, Validator, VendorProfile,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{AdminError, Result};
use crate::products::ProductForm;
use crate::state::Admin;

const MIN_STORE_NAME_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorProfileForm {
    pub store_name: String,
    pub contact_email: String,
    pub phone: String,
    pub description: String,
}

impl VendorProfileForm {
    #[must_use]
    pub fn for_vendor(profile: &VendorProfile) -> Self {
        Self {
            store_name: profile.store_name.clone(),
            contact_email: profile.contact_email.to_string(),
            phone: profile.phone.clone().unwrap_or_default(),
            description: profile.description.clone().unwrap_or_default(),
        }
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> std::result::Result<VendorProfileUpdate, ValidationErrors> {
        let mut v = Validator::new();
        let store_name = v.min_len("store_name", &self.store_name, MIN_STORE_NAME_LEN);
        let contact_email = v.email("contact_email", &self.contact_email);

        let (Some(store_name), Some(contact_email)) = (store_name, contact_email) else {
            return Err(v.finish().err().unwrap_or_default());
        };
        v.finish()?;

        Ok(VendorProfileUpdate {
            store_name,
            contact_email,
            phone: optional(&self.phone),
            description: optional(&self.description),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|s| !s.is_empty())
}

impl Admin {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn vendor_profile(&self) -> Result<VendorProfile> {
        Ok(self.api().get_vendor_profile().await?)
    }

    /// # Errors
    ///
    /// Returns validation errors before any request, or an API error.
    #[instrument(skip(self, form))]
    pub async fn update_vendor_profile(&self, form: &VendorProfileForm) -> Result<VendorProfile> {
        let update = form.validate()?;
        Ok(self.api().update_vendor_profile(&update).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn vendor_products(&self) -> Result<Vec<Product>> {
        Ok(self.api().list_vendor_products().await?)
    }

    /// Create a product owned by the signed-in vendor.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any request, or an API error.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create_vendor_product(&self, form: &ProductForm) -> Result<Product> {
        // Bad forms fail before any request.
        form.validate(None)?;
        let vendor = self.vendor_profile().await?;
        let draft = form.validate(Some(vendor.id))?;
        self.save_new(&draft).await
    }

    /// # Errors
    ///
    /// Returns `Forbidden` if the product belongs to someone else, validation
    /// errors, or an API error.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update_vendor_product(
        &self,
        id: ProductId,
        form: &ProductForm,
    ) -> Result<Product> {
        form.validate(None)?;
        let owned = self.owned_product(id).await?;
        let draft = form.validate(owned.vendor_id)?;
        self.save_existing(id, &draft).await
    }

    /// # Errors
    ///
    /// Returns `Forbidden` if the product belongs to someone else, or an API
    /// error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_vendor_product(&self, id: ProductId) -> Result<()> {
        self.owned_product(id).await?;
        self.delete_product(id).await
    }

    /// Orders containing the vendor's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn vendor_orders(&self) -> Result<Vec<Order>> {
        Ok(self.api().list_vendor_orders().await?)
    }

    /// Move one of the vendor's orders under the configured policy.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for an order outside the vendor's list, a
    /// transition error, or an API error.
    #[instrument(skip(self), fields(order_id = %id, to = %to))]
    pub async fn update_vendor_order_status(
        &self,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order> {
        let order = self
            .vendor_orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| {
                warn!(order_id = %id, "Vendor tried to update an order it does not own");
                AdminError::Forbidden(format!("order {id}"))
            })?;
        self.apply_status(&order, to).await
    }

    async fn owned_product(&self, id: ProductId) -> Result<Product> {
        self.vendor_products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| {
                warn!(product_id = %id, "Vendor tried to change a product it does not own");
                AdminError::Forbidden(format!("product {id}"))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form() {
        let form = VendorProfileForm {
            store_name: "Loom & Co".to_string(),
            contact_email: "hello@loom.example".to_string(),
            phone: "  ".to_string(),
            description: "Hand-woven basics".to_string(),
        };
        let update = form.validate().unwrap();
        assert_eq!(update.store_name, "Loom & Co");
        assert!(update.phone.is_none());
        assert_eq!(update.description.as_deref(), Some("Hand-woven basics"));
    }

    #[test]
    fn test_profile_form_rejects_short_name_and_bad_email() {
        let form = VendorProfileForm {
            store_name: "L".to_string(),
            contact_email: "loom".to_string(),
            ..VendorProfileForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.has("store_name"));
        assert!(err.has("contact_email"));
    }
}

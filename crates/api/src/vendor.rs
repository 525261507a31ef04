//! Vendor self-service endpoints. The bearer token identifies the vendor.

use bazaar_core::{Order, Product, VendorProfile};
use reqwest::Method;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::VendorProfileUpdate;

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_vendor_profile(&self) -> Result<VendorProfile, ApiError> {
        let request = self.request(Method::GET, "/vendor/profile").await?;
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(store_name = %update.store_name))]
    pub async fn update_vendor_profile(
        &self,
        update: &VendorProfileUpdate,
    ) -> Result<VendorProfile, ApiError> {
        let request = self
            .request(Method::PUT, "/vendor/profile")
            .await?
            .json(update);
        self.fetch(request).await
    }

    /// Products owned by the signed-in vendor. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_vendor_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/vendor/products").await?;
        self.fetch(request).await
    }

    /// Orders containing the signed-in vendor's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_vendor_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self.request(Method::GET, "/vendor/orders").await?;
        self.fetch(request).await
    }
}

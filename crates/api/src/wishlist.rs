use bazaar_core::{Owner, ProductId, Wishlist};
use reqwest::Method;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{WishlistEntry, WishlistRequest, owner_param};

impl ApiClient {
    /// Get the owner's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn get_wishlist(&self, owner: &Owner) -> Result<Wishlist, ApiError> {
        let request = self
            .request(Method::GET, "/wishlist")
            .await?
            .query(&owner_param(owner));
        let entries: Vec<WishlistEntry> = self.fetch(request).await?;
        Ok(entries.into_iter().map(|e| e.product_id).collect())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(owner = %owner, product_id = %product_id))]
    pub async fn add_to_wishlist(&self, owner: &Owner, product_id: ProductId) -> Result<(), ApiError> {
        let body = WishlistRequest {
            owner: owner.as_query_value(),
            product_id,
        };
        let request = self.request(Method::POST, "/wishlist").await?.json(&body);
        self.send(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(owner = %owner, product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        owner: &Owner,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, &format!("/wishlist/{product_id}"))
            .await?
            .query(&owner_param(owner));
        self.send(request).await
    }
}

//! Server-side cart endpoints, keyed by owner.

use bazaar_core::{CartLine, CartLineId, CartSelection, Owner};
use reqwest::Method;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{AddCartLineRequest, QuantityRequest, owner_param};

impl ApiClient {
    /// List the owner's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn get_cart(&self, owner: &Owner) -> Result<Vec<CartLine>, ApiError> {
        let request = self
            .request(Method::GET, "/cart")
            .await?
            .query(&owner_param(owner));
        self.fetch(request).await
    }

    /// Add a new line for a validated variant selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, selection), fields(owner = %owner, product_id = %selection.product_id))]
    pub async fn add_cart_line(
        &self,
        owner: &Owner,
        selection: &CartSelection,
        quantity: u32,
    ) -> Result<CartLine, ApiError> {
        let body = AddCartLineRequest {
            owner: owner.as_query_value(),
            product_id: selection.product_id,
            size: selection.size,
            color: &selection.color,
            quantity,
        };
        let request = self.request(Method::POST, "/cart").await?.json(&body);
        self.fetch(request).await
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the line is gone, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn update_cart_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("/cart/{id}"))
            .await?
            .json(&QuantityRequest { quantity });
        self.fetch(request).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn remove_cart_line(&self, id: CartLineId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/cart/{id}")).await?;
        self.send(request).await
    }

    /// Remove every line the owner has.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn clear_cart(&self, owner: &Owner) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, "/cart")
            .await?
            .query(&owner_param(owner));
        self.send(request).await
    }
}

//! Order endpoints.

use bazaar_core::{NewOrder, Order, OrderId, OrderStatus, Owner};
use reqwest::Method;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{StatusRequest, owner_param};

impl ApiClient {
    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, order), fields(lines = order.lines.len(), total = %order.total))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let request = self.request(Method::POST, "/orders").await?.json(order);
        self.fetch(request).await
    }

    /// List orders, optionally restricted to one owner.
    ///
    /// Without an owner the backend returns every order the token may see.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, owner: Option<&Owner>) -> Result<Vec<Order>, ApiError> {
        let mut request = self.request(Method::GET, "/orders").await?;
        if let Some(owner) = owner {
            request = request.query(&owner_param(owner));
        }
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no order has this id, or another error
    /// if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let request = self.request(Method::GET, &format!("/orders/{id}")).await?;
        self.fetch(request).await
    }

    /// Set an order's status. Transition rules are enforced by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("/orders/{id}/status"))
            .await?
            .json(&StatusRequest { status });
        self.fetch(request).await
    }
}

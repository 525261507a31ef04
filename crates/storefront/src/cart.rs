//! Remote cart synchronization.
//!
//! The server holds the cart; [`CartSync`] keeps a local copy for rendering.
//! Mutations are serialized: each one is sent, its result is applied to the
//! local copy, the cart is re-fetched, and only then may the next mutation
//! start. Once the server accepts a mutation it is never reported as failed;
//! a failed re-fetch only leaves the local copy as the mutation left it.
//! Reads never wait on an in-flight mutation.

use std::sync::Arc;

use bazaar_api::ApiClient;
use bazaar_api::telemetry::add_breadcrumb;
use bazaar_core::{AddOutcome, Cart, CartLine, CartLineId, CartSelection, Price, Product, Size};
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::session::Session;

/// Local view of the server-side cart.
pub struct CartSync {
    api: ApiClient,
    session: Arc<Session>,
    cart: RwLock<Cart>,
    mutation: Mutex<()>,
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync").finish_non_exhaustive()
    }
}

impl CartSync {
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            cart: RwLock::new(Cart::new()),
            mutation: Mutex::new(()),
        }
    }

    /// The last cart fetched from the server.
    pub async fn snapshot(&self) -> Cart {
        self.cart.read().await.clone()
    }

    pub async fn lines(&self) -> Vec<CartLine> {
        self.cart.read().await.lines().to_vec()
    }

    /// Exact sum of line subtotals.
    pub async fn total(&self) -> Price {
        self.cart.read().await.total()
    }

    /// Total units, for the header badge.
    pub async fn count(&self) -> u32 {
        self.cart.read().await.count()
    }

    /// Re-fetch the cart for the current owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the local copy is unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        self.reload().await
    }

    /// Add one unit of a product variant.
    ///
    /// Size and color are checked before any request. An existing line for the
    /// same variant has its quantity raised instead of gaining a sibling.
    ///
    /// # Errors
    ///
    /// Returns a cart error for a missing or unavailable selection, or an API
    /// error if a request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(
        &self,
        product: &Product,
        size: Option<Size>,
        color: &str,
    ) -> Result<AddOutcome> {
        let selection = CartSelection::new(product, size, color)?;
        let _guard = self.mutation.lock().await;

        let existing = self
            .cart
            .read()
            .await
            .find_variant(&selection)
            .map(|line| (line.id, line.quantity));

        let (outcome, line) = match existing {
            Some((id, quantity)) => {
                let line = self
                    .api
                    .update_cart_quantity(id, quantity.saturating_add(1))
                    .await?;
                (AddOutcome::Merged(id), line)
            }
            None => {
                let owner = self.session.owner().await?;
                let line = self.api.add_cart_line(&owner, &selection, 1).await?;
                (AddOutcome::Added(line.id), line)
            }
        };
        self.cart.write().await.upsert_line(line);

        let product_id = product.id.to_string();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[
                ("product_id", product_id.as_str()),
                ("size", selection.size.slug()),
                ("color", selection.color.as_str()),
            ]),
        );

        self.reload_after("add").await;
        Ok(outcome)
    }

    /// Set a line's quantity. Quantities below 1 are ignored without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn update_quantity(&self, id: CartLineId, quantity: u32) -> Result<()> {
        if quantity < 1 {
            return Ok(());
        }
        let _guard = self.mutation.lock().await;
        let line = self.api.update_cart_quantity(id, quantity).await?;
        self.cart.write().await.upsert_line(line);
        self.reload_after("quantity update").await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if a request fails.
    #[instrument(skip(self), fields(line_id = %id))]
    pub async fn remove_item(&self, id: CartLineId) -> Result<()> {
        let _guard = self.mutation.lock().await;
        self.api.remove_cart_line(id).await?;
        self.cart.write().await.remove_item(id);
        let line_id = id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("line_id", line_id.as_str())]));
        self.reload_after("removal").await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if a request fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        let owner = self.session.owner().await?;
        self.api.clear_cart(&owner).await?;
        self.cart.write().await.clear();
        self.reload_after("clear").await;
        Ok(())
    }

    /// Forget the local copy without touching the server, e.g. when the owner
    /// changes at logout.
    pub async fn reset(&self) {
        let _guard = self.mutation.lock().await;
        *self.cart.write().await = Cart::new();
    }

    async fn reload(&self) -> Result<()> {
        let owner = self.session.owner().await?;
        let lines = self.api.get_cart(&owner).await?;
        *self.cart.write().await = Cart::from_lines(lines);
        Ok(())
    }

    async fn reload_after(&self, mutation: &'static str) {
        if let Err(e) = self.reload().await {
            warn!(error = %e, mutation, "Cart refetch failed after mutation");
        }
    }
}

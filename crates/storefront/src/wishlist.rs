//! Remote wishlist synchronization with optimistic toggles.
//!
//! A toggle flips local membership immediately, sends the matching request,
//! and rolls the flip back if the request fails. Toggles are serialized so a
//! rapid double toggle always ends where it started.

use std::sync::Arc;

use bazaar_api::ApiClient;
use bazaar_api::telemetry::add_breadcrumb;
use bazaar_core::{Product, ProductId, Wishlist, WishlistChange};
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::session::Session;

pub struct WishlistSync {
    api: ApiClient,
    session: Arc<Session>,
    wishlist: RwLock<Wishlist>,
    mutation: Mutex<()>,
}

impl std::fmt::Debug for WishlistSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistSync").finish_non_exhaustive()
    }
}

impl WishlistSync {
    #[must_use]
    pub fn new(api: ApiClient, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            wishlist: RwLock::new(Wishlist::new()),
            mutation: Mutex::new(()),
        }
    }

    pub async fn contains(&self, id: ProductId) -> bool {
        self.wishlist.read().await.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.wishlist.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wishlist.read().await.is_empty()
    }

    pub async fn ids(&self) -> Vec<ProductId> {
        self.wishlist.read().await.ids()
    }

    /// Wishlisted products present in `catalog`, in catalog order.
    pub async fn products(&self, catalog: &[Product]) -> Vec<Product> {
        let wishlist = self.wishlist.read().await;
        catalog
            .iter()
            .filter(|p| wishlist.contains(p.id))
            .cloned()
            .collect()
    }

    /// # Errors
    ///
    /// Returns an error if the request fails; the local copy is unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        self.reload().await
    }

    /// Add the product if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, after rolling the local change
    /// back.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle(&self, id: ProductId) -> Result<WishlistChange> {
        let _guard = self.mutation.lock().await;
        let owner = self.session.owner().await?;

        let change = self.wishlist.write().await.toggle(id);
        let sent = match change {
            WishlistChange::Added => self.api.add_to_wishlist(&owner, id).await,
            WishlistChange::Removed => self.api.remove_from_wishlist(&owner, id).await,
        };

        if let Err(e) = sent {
            self.wishlist.write().await.apply(id, change.inverse());
            return Err(e.into());
        }

        let product_id = id.to_string();
        let message = match change {
            WishlistChange::Added => "Added to wishlist",
            WishlistChange::Removed => "Removed from wishlist",
        };
        add_breadcrumb("wishlist", message, Some(&[("product_id", product_id.as_str())]));

        // The toggle itself succeeded; a failed reconcile keeps the local state.
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Wishlist refetch failed after toggle");
        }
        Ok(change)
    }

    pub async fn reset(&self) {
        let _guard = self.mutation.lock().await;
        *self.wishlist.write().await = Wishlist::new();
    }

    async fn reload(&self) -> Result<()> {
        let owner = self.session.owner().await?;
        let wishlist = self.api.get_wishlist(&owner).await?;
        *self.wishlist.write().await = wishlist;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_api::ApiConfig;

    use crate::session::MemoryStore;

    fn unreachable_backend() -> WishlistSync {
        let mut config = ApiConfig::new(url::Url::parse("http://127.0.0.1:9").unwrap());
        config.timeout = std::time::Duration::from_millis(200);
        WishlistSync::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(Session::open(Arc::new(MemoryStore::default()))),
        )
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back() {
        let wishlist = unreachable_backend();
        assert!(wishlist.toggle(ProductId::new(3)).await.is_err());
        assert!(!wishlist.contains(ProductId::new(3)).await);
        assert!(wishlist.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_failed_toggles_leave_consistent_state() {
        let wishlist = Arc::new(unreachable_backend());
        let a = tokio::spawn({
            let wishlist = wishlist.clone();
            async move { wishlist.toggle(ProductId::new(8)).await }
        });
        let b = tokio::spawn({
            let wishlist = wishlist.clone();
            async move { wishlist.toggle(ProductId::new(8)).await }
        });
        assert!(a.await.unwrap().is_err());
        assert!(b.await.unwrap().is_err());
        assert!(!wishlist.contains(ProductId::new(8)).await);
    }
}

//! Storefront context shared by every presentation component.

use std::sync::Arc;

use bazaar_api::{ApiClient, ApiError};
use bazaar_core::{CustomerProfile, Owner};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::cart::CartSync;
use crate::catalog::CatalogStore;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::session::{FileStore, LocalStore, Session};
use crate::wishlist::WishlistSync;

/// Storefront state: catalog, cart, wishlist, session and the signed-in
/// customer.
///
/// This struct is cheaply cloneable via `Arc`. The cart and wishlist are only
/// reachable through their sync wrappers, so every change goes through the
/// serialized mutation path.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: Arc<Session>,
    catalog: CatalogStore,
    cart: CartSync,
    wishlist: WishlistSync,
    customer: RwLock<Option<CustomerProfile>>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create the storefront with session state persisted at
    /// `config.state_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let store = Arc::new(FileStore::new(&config.state_path));
        Self::with_store(config, store)
    }

    /// Create the storefront with a custom session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn LocalStore>) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let session = Arc::new(Session::open(store));

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                catalog: CatalogStore::new(api.clone()),
                cart: CartSync::new(api.clone(), session.clone()),
                wishlist: WishlistSync::new(api.clone(), session.clone()),
                customer: RwLock::new(None),
                config,
                api,
                session,
            }),
        })
    }

    /// Restore the signed-in customer if the stored login is still valid, then
    /// load the catalog, cart and wishlist.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the other loads still run. A profile fetch
    /// that fails for any reason other than an expired login keeps the
    /// session signed in.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut profile_error = None;
        if self.session().is_logged_in().await {
            match self.api().get_profile().await {
                Ok(profile) => self.set_customer(Some(profile)).await,
                Err(ApiError::Unauthorized(_)) => {
                    info!("Stored login is no longer valid");
                    self.session().mark_logged_out().await?;
                }
                Err(e) => {
                    warn!(error = %e, "Profile restore failed");
                    profile_error = Some(e);
                }
            }
        }

        let (catalog, cart, wishlist) = tokio::join!(
            self.catalog().load(),
            self.cart().refresh(),
            self.wishlist().refresh(),
        );
        if let Some(e) = profile_error {
            return Err(e.into());
        }
        catalog?;
        cart?;
        wishlist?;
        Ok(())
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartSync {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistSync {
        &self.inner.wishlist
    }

    /// The signed-in customer, if any.
    pub async fn customer(&self) -> Option<CustomerProfile> {
        self.inner.customer.read().await.clone()
    }

    /// Current cart/wishlist owner.
    ///
    /// # Errors
    ///
    /// Returns an error if a new session id cannot be persisted.
    pub async fn owner(&self) -> Result<Owner> {
        Ok(self.session().owner().await?)
    }

    pub(crate) async fn set_customer(&self, profile: Option<CustomerProfile>) {
        match &profile {
            Some(p) => bazaar_api::telemetry::set_sentry_user(&p.id, Some(p.email.as_str())),
            None => bazaar_api::telemetry::clear_sentry_user(),
        }
        *self.inner.customer.write().await = profile;
    }

    /// Re-fetch cart and wishlist after the owner changed. Failures are
    /// logged; the aggregates stay empty until the next refresh.
    pub(crate) async fn reload_owned(&self) {
        self.cart().reset().await;
        self.wishlist().reset().await;
        let (cart, wishlist) = tokio::join!(self.cart().refresh(), self.wishlist().refresh());
        if let Err(e) = cart {
            warn!(error = %e, "Cart refresh failed after owner change");
        }
        if let Err(e) = wishlist {
            warn!(error = %e, "Wishlist refresh failed after owner change");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    fn offline() -> Storefront {
        let mut config = StorefrontConfig::new(url::Url::parse("http://127.0.0.1:9").unwrap());
        config.api.timeout = std::time::Duration::from_millis(200);
        Storefront::with_store(config, Arc::new(MemoryStore::default())).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_owner_is_stable() {
        let storefront = offline();
        assert!(storefront.customer().await.is_none());

        let first = storefront.owner().await.unwrap();
        assert!(matches!(first, Owner::Session(_)));
        assert_eq!(storefront.clone().owner().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_start_reports_unreachable_backend() {
        let storefront = offline();
        assert!(storefront.start().await.is_err());
        assert!(storefront.catalog().view().await.is_loading());
    }
}

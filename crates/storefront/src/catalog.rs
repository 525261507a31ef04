//! Catalog store and product listings.
//!
//! The full product collection is fetched once and held as an immutable
//! snapshot. Every load takes a generation ticket; a result whose ticket is
//! no longer the latest is dropped so an abandoned load can never overwrite a
//! newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bazaar_api::{ApiClient, ApiError};
use bazaar_core::catalog::{self, ProductQuery, Reveal};
use bazaar_core::{Product, ProductId};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{Result, StorefrontError};

/// Number of products shown in each home-page rail.
pub const RAIL_SIZE: usize = 8;

/// What the catalog currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogView {
    /// No load has completed yet.
    #[default]
    Loading,
    /// The latest snapshot, possibly empty.
    Ready(Arc<Vec<Product>>),
}

impl CatalogView {
    #[must_use]
    pub fn products(&self) -> Option<&[Product]> {
        match self {
            Self::Loading => None,
            Self::Ready(products) => Some(products.as_slice()),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Ticket identifying one catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// In-memory catalog snapshot.
pub struct CatalogStore {
    api: ApiClient,
    generation: AtomicU64,
    view: RwLock<CatalogView>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            view: RwLock::new(CatalogView::Loading),
        }
    }

    pub async fn view(&self) -> CatalogView {
        self.view.read().await.clone()
    }

    /// Fetch the catalog and install it if no newer load has started.
    ///
    /// Returns `true` if this load's result was installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The previous snapshot stays.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<bool> {
        let ticket = self.begin_load();
        let products = self.api.list_products().await?;
        Ok(self.finish_load(ticket, products).await)
    }

    /// Start a load; any earlier outstanding ticket becomes stale.
    pub fn begin_load(&self) -> LoadTicket {
        LoadTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install `products` if `ticket` is still the latest.
    pub async fn finish_load(&self, ticket: LoadTicket, products: Vec<Product>) -> bool {
        let mut view = self.view.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            debug!(ticket = ticket.0, "Dropping stale catalog result");
            return false;
        }
        debug!(count = products.len(), "Catalog loaded");
        *view = CatalogView::Ready(Arc::new(products));
        true
    }

    /// Look a product up in the snapshot only.
    pub async fn find(&self, id: ProductId) -> Option<Product> {
        self.view
            .read()
            .await
            .products()
            .and_then(|products| products.iter().find(|p| p.id == id).cloned())
    }

    /// Get a product, from the snapshot when loaded, otherwise from the backend.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if no product has this id, or
    /// another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        if let Some(product) = self.find(id).await {
            return Ok(product);
        }
        if !self.view.read().await.is_loading() {
            return Err(StorefrontError::NotFound(format!("product {id}")));
        }
        match self.api.get_product(id).await {
            Ok(product) => Ok(product),
            Err(ApiError::NotFound(_)) => Err(StorefrontError::NotFound(format!("product {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Products matching `query`, or `None` while still loading.
    pub async fn search(&self, query: &ProductQuery) -> Option<Vec<Product>> {
        let view = self.view.read().await;
        view.products()
            .map(|products| query.apply(products).into_iter().cloned().collect())
    }

    pub async fn new_arrivals(&self) -> Vec<Product> {
        self.rail(|p| catalog::new_arrivals(p, RAIL_SIZE)).await
    }

    pub async fn best_sellers(&self) -> Vec<Product> {
        self.rail(|p| catalog::best_sellers(p, RAIL_SIZE)).await
    }

    /// Other products in the same category as `product`.
    pub async fn related(&self, product: &Product) -> Vec<Product> {
        self.rail(|p| catalog::related(p, product, RAIL_SIZE)).await
    }

    async fn rail(
        &self,
        pick: impl for<'p> Fn(&'p [Product]) -> Vec<&'p Product>,
    ) -> Vec<Product> {
        let view = self.view.read().await;
        view.products()
            .map(|products| pick(products).into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Filter, sort and reveal state for one product grid.
///
/// Changing the query resets the reveal window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    query: ProductQuery,
    reveal: Reveal,
}

impl Listing {
    #[must_use]
    pub fn new(query: ProductQuery) -> Self {
        Self {
            query,
            reveal: Reveal::new(),
        }
    }

    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Replace the filter and sort state; the reveal window starts over.
    pub fn set_query(&mut self, query: ProductQuery) {
        if query != self.query {
            self.query = query;
            self.reveal.reset();
        }
    }

    /// Edit the query in place; the reveal window starts over if it changed.
    pub fn update_query(&mut self, edit: impl FnOnce(ProductQuery) -> ProductQuery) {
        let query = edit(self.query.clone());
        self.set_query(query);
    }

    /// The currently revealed products.
    #[must_use]
    pub fn visible<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let matching = self.query.apply(products);
        self.reveal.slice(&matching).to_vec()
    }

    /// Number of products matching the query.
    #[must_use]
    pub fn total(&self, products: &[Product]) -> usize {
        products.iter().filter(|p| self.query.matches(p)).count()
    }

    #[must_use]
    pub fn has_more(&self, products: &[Product]) -> bool {
        self.reveal.has_more(self.total(products))
    }

    /// Reveal the next batch.
    pub fn show_more(&mut self, products: &[Product]) {
        let total = self.total(products);
        self.reveal.reveal_more(total);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_api::ApiConfig;
    use bazaar_core::catalog::SortKey;
    use bazaar_core::{Category, Gender, Price, Size, SubCategory};

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(1000 + id),
            original_price: None,
            category: if id % 2 == 0 { Category::Shoes } else { Category::Clothing },
            sub_category: SubCategory::Sneakers,
            gender: Gender::Women,
            images: Vec::new(),
            sizes: [Size::M].into_iter().collect(),
            colors: vec!["Black".to_string()],
            stock: 3,
            new_arrival: id > 25,
            best_seller: id % 10 == 0,
            vendor_id: None,
        }
    }

    fn catalog(n: i64) -> Vec<Product> {
        (1..=n).map(product).collect()
    }

    fn store() -> CatalogStore {
        let config = ApiConfig::new(url::Url::parse("http://127.0.0.1:9").unwrap());
        CatalogStore::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_loading_is_distinct_from_empty() {
        let store = store();
        assert!(store.view().await.is_loading());
        assert!(store.search(&ProductQuery::default()).await.is_none());

        let ticket = store.begin_load();
        assert!(store.finish_load(ticket, Vec::new()).await);
        assert_eq!(store.search(&ProductQuery::default()).await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_stale_load_is_dropped() {
        let store = store();
        let abandoned = store.begin_load();
        let latest = store.begin_load();

        assert!(store.finish_load(latest, catalog(3)).await);
        assert!(!store.finish_load(abandoned, catalog(30)).await);

        let view = store.view().await;
        assert_eq!(view.products().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_after_load_reports_not_found() {
        let store = store();
        let ticket = store.begin_load();
        store.finish_load(ticket, catalog(3)).await;

        assert_eq!(store.product(ProductId::new(2)).await.unwrap().id, ProductId::new(2));
        let err = store.product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rails() {
        let store = store();
        assert!(store.new_arrivals().await.is_empty());

        let ticket = store.begin_load();
        store.finish_load(ticket, catalog(30)).await;

        let arrivals = store.new_arrivals().await;
        assert_eq!(arrivals.len(), 5);
        assert_eq!(arrivals[0].id, ProductId::new(30));
        assert_eq!(store.best_sellers().await.len(), 3);

        let shoe = product(4);
        let related = store.related(&shoe).await;
        assert_eq!(related.len(), RAIL_SIZE);
        assert!(related.iter().all(|p| p.category == Category::Shoes && p.id != shoe.id));
    }

    #[test]
    fn test_listing_reveals_in_steps_and_resets_on_filter_change() {
        let products = catalog(30);
        let mut listing = Listing::default();

        assert_eq!(listing.visible(&products).len(), 8);
        listing.show_more(&products);
        assert_eq!(listing.visible(&products).len(), 12);
        assert!(listing.has_more(&products));

        listing.update_query(|q| q.sort(SortKey::PriceAsc));
        assert_eq!(listing.visible(&products).len(), 8);
        assert_eq!(listing.visible(&products)[0].id, ProductId::new(1));

        listing.update_query(|q| q.category("shoes"));
        assert_eq!(listing.total(&products), 15);
        for _ in 0..5 {
            listing.show_more(&products);
        }
        assert_eq!(listing.visible(&products).len(), 15);
        assert!(!listing.has_more(&products));
    }

    #[test]
    fn test_unchanged_query_keeps_reveal() {
        let products = catalog(30);
        let mut listing = Listing::default();
        listing.show_more(&products);
        listing.set_query(ProductQuery::default());
        assert_eq!(listing.visible(&products).len(), 12);
    }
}

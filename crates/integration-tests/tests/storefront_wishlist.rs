//! Optimistic wishlist toggles against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bazaar_core::{ProductId, WishlistChange};
use bazaar_integration_tests::MockBackend;
use bazaar_storefront::session::MemoryStore;
use bazaar_storefront::{Storefront, StorefrontConfig};

async fn storefront(backend: &MockBackend) -> Storefront {
    let storefront = Storefront::with_store(
        StorefrontConfig::new(backend.url.clone()),
        Arc::new(MemoryStore::default()),
    )
    .expect("storefront");
    storefront.start().await.expect("start");
    storefront
}

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;
    let id = ProductId::new(5);

    assert_eq!(sf.wishlist().toggle(id).await.unwrap(), WishlistChange::Added);
    assert!(sf.wishlist().contains(id).await);
    assert_eq!(sf.wishlist().len().await, 1);

    assert_eq!(sf.wishlist().toggle(id).await.unwrap(), WishlistChange::Removed);
    assert!(!sf.wishlist().contains(id).await);
    assert!(sf.wishlist().is_empty().await);

    assert_eq!(backend.requests_to("POST", "/wishlist").len(), 1);
    assert_eq!(backend.requests_to("DELETE", "/wishlist/5").len(), 1);
}

#[tokio::test]
async fn test_failed_toggle_rolls_back() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;
    let kept = ProductId::new(2);
    let id = ProductId::new(9);
    sf.wishlist().toggle(kept).await.unwrap();

    backend.fail_next(502);
    assert!(sf.wishlist().toggle(id).await.is_err());
    assert!(!sf.wishlist().contains(id).await);
    assert_eq!(sf.wishlist().ids().await, vec![kept]);

    // Removal rolls back too.
    backend.fail_next(500);
    assert!(sf.wishlist().toggle(kept).await.is_err());
    assert!(sf.wishlist().contains(kept).await);
}

#[tokio::test]
async fn test_rapid_double_toggle_ends_where_it_started() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;
    let id = ProductId::new(7);

    let (first, second) = tokio::join!(sf.wishlist().toggle(id), sf.wishlist().toggle(id));
    let mut changes = vec![first.unwrap(), second.unwrap()];
    changes.sort_by_key(|c| *c == WishlistChange::Removed);
    assert_eq!(changes, vec![WishlistChange::Added, WishlistChange::Removed]);

    assert!(!sf.wishlist().contains(id).await);
    sf.wishlist().refresh().await.unwrap();
    assert!(sf.wishlist().is_empty().await);
}

#[tokio::test]
async fn test_wishlist_products_follow_catalog_order() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;
    for id in [8, 1, 4] {
        sf.wishlist().toggle(ProductId::new(id)).await.unwrap();
    }

    let catalog = sf.catalog().view().await;
    let products = sf.wishlist().products(catalog.products().unwrap()).await;
    let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
    assert_eq!(ids, vec![1, 4, 8]);
}

#[tokio::test]
async fn test_wishlist_survives_restart_of_same_session() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryStore::default());
    let config = StorefrontConfig::new(backend.url.clone());

    let sf = Storefront::with_store(config.clone(), store.clone()).unwrap();
    sf.start().await.unwrap();
    sf.wishlist().toggle(ProductId::new(3)).await.unwrap();

    let again = Storefront::with_store(config, store).unwrap();
    again.start().await.unwrap();
    assert!(again.wishlist().contains(ProductId::new(3)).await);
}

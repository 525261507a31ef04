//! Login, registration and profile flows against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bazaar_api::ApiError;
use bazaar_core::{ProductId, Size};
use bazaar_integration_tests::{CUSTOMER_EMAIL, CUSTOMER_ID, CUSTOMER_PASSWORD, MockBackend};
use bazaar_storefront::account::{LoginForm, ProfileForm, RegisterForm};
use bazaar_storefront::session::{MemoryStore, SessionState};
use bazaar_storefront::{Storefront, StorefrontConfig, StorefrontError};

async fn storefront(backend: &MockBackend) -> Storefront {
    let storefront = Storefront::with_store(
        StorefrontConfig::new(backend.url.clone()),
        Arc::new(MemoryStore::default()),
    )
    .expect("storefront");
    storefront.start().await.expect("start");
    storefront
}

fn login_form(password: &str) -> LoginForm {
    LoginForm {
        email: CUSTOMER_EMAIL.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_sets_customer_and_session() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;

    let profile = sf.login(&login_form(CUSTOMER_PASSWORD)).await.unwrap();
    assert_eq!(profile.id, CUSTOMER_ID);
    assert_eq!(sf.customer().await, Some(profile));
    assert!(sf.session().is_logged_in().await);
    assert!(sf.api().has_token().await);
}

#[tokio::test]
async fn test_wrong_password_stays_anonymous() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;

    let err = sf.login(&login_form("not the password")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!err.is_server_error());
    assert_eq!(err.notice(), "Please sign in to continue.");
    assert!(sf.customer().await.is_none());
    assert!(!sf.session().is_logged_in().await);
}

#[tokio::test]
async fn test_invalid_login_form_sends_nothing() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;

    let err = sf
        .login(&LoginForm {
            email: "ada".to_string(),
            password: String::new(),
        })
        .await
        .unwrap_err();
    let fields = err.field_errors().expect("validation errors");
    assert!(fields.has("email"));
    assert_eq!(fields.for_field("password"), Some("is required"));
    assert!(backend.requests_to("POST", "/auth/login").is_empty());
}

#[tokio::test]
async fn test_register_new_account_and_conflict() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;

    let form = RegisterForm {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        password: "cobol for ever".to_string(),
        confirm_password: "cobol for ever".to_string(),
    };
    let profile = sf.register(&form).await.unwrap();
    assert_eq!(profile.name, "Grace Hopper");
    assert_eq!(
        sf.owner().await.unwrap().as_query_value(),
        format!("user:{}", profile.id)
    );

    let taken = RegisterForm {
        email: CUSTOMER_EMAIL.to_string(),
        ..form
    };
    let err = sf.register(&taken).await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Api(ApiError::Status { status: 409, .. })
    ));
    assert_eq!(err.notice(), "Email already registered");
}

#[tokio::test]
async fn test_cart_follows_owner_across_login_and_logout() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;
    let sneaker = sf.catalog().product(ProductId::new(1)).await.expect("product");

    sf.cart().add_item(&sneaker, Some(Size::S), "White").await.unwrap();
    sf.wishlist().toggle(ProductId::new(2)).await.unwrap();
    let anonymous = sf.owner().await.unwrap();

    sf.login(&login_form(CUSTOMER_PASSWORD)).await.unwrap();
    assert_eq!(sf.cart().count().await, 0);
    assert!(sf.wishlist().is_empty().await);

    sf.logout().await.unwrap();
    assert!(sf.customer().await.is_none());
    assert!(!sf.api().has_token().await);
    assert_eq!(sf.owner().await.unwrap(), anonymous);
    assert_eq!(sf.cart().count().await, 1);
    assert!(sf.wishlist().contains(ProductId::new(2)).await);
}

#[tokio::test]
async fn test_stale_login_is_dropped_on_start() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryStore::new(SessionState {
        logged_in: true,
        user_id: Some(CUSTOMER_ID),
        ..SessionState::default()
    }));
    let sf = Storefront::with_store(StorefrontConfig::new(backend.url.clone()), store).unwrap();

    sf.start().await.unwrap();
    assert!(!sf.session().is_logged_in().await);
    assert!(sf.customer().await.is_none());
    assert!(sf.owner().await.unwrap().as_query_value().starts_with("session:"));
    assert!(sf.catalog().view().await.products().is_some());
}

#[tokio::test]
async fn test_profile_outage_on_start_still_loads_the_rest() {
    let backend = MockBackend::start().await;
    let store = Arc::new(MemoryStore::new(SessionState {
        logged_in: true,
        user_id: Some(CUSTOMER_ID),
        ..SessionState::default()
    }));
    let sf = Storefront::with_store(StorefrontConfig::new(backend.url.clone()), store).unwrap();

    backend.fail_next_to("GET", "/account/profile", 503);
    let err = sf.start().await.unwrap_err();
    assert!(err.is_server_error());
    assert!(sf.session().is_logged_in().await);
    assert!(sf.customer().await.is_none());
    assert!(sf.catalog().view().await.products().is_some());
    assert_eq!(backend.requests_to("GET", "/cart").len(), 1);
    assert_eq!(backend.requests_to("GET", "/wishlist").len(), 1);
}

#[tokio::test]
async fn test_update_profile() {
    let backend = MockBackend::start().await;
    let sf = storefront(&backend).await;

    let err = sf.update_profile(&ProfileForm::default()).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NotLoggedIn));

    let profile = sf.login(&login_form(CUSTOMER_PASSWORD)).await.unwrap();
    let mut form = ProfileForm::for_customer(&profile);
    form.name = "Ada Lovelace".to_string();
    form.phone = String::new();

    let updated = sf.update_profile(&form).await.unwrap();
    assert_eq!(updated.name, "Ada Lovelace");
    assert!(updated.phone.is_none());
    assert_eq!(updated.address, profile.address);
    assert_eq!(sf.customer().await, Some(updated));
}

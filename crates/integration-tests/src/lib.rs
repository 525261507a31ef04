//! Integration test support for Bazaar.
//!
//! [`MockBackend`] serves the marketplace HTTP API from memory on an ephemeral
//! port so the real client, storefront and admin code can be driven end to
//! end. Every request is recorded for assertions on paths, bearer tokens and
//! content types, and the next response can be forced to fail.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use bazaar_core::{
    AccountRole, CartLine, CartLineId, Category, ContactDetails, CustomerProfile, Email, Gender,
    NewOrder, Order, OrderId, OrderLine, OrderStatus, PaymentMethod, Price, Product, ProductDraft,
    ProductId, ShippingAddress, Size, SubCategory, UserId, VendorId, VendorProfile,
};
use serde::Deserialize;
use serde_json::json;
use url::Url;

/// Seeded customer credentials.
pub const CUSTOMER_EMAIL: &str = "ada@example.com";
pub const CUSTOMER_PASSWORD: &str = "correct horse battery";
pub const CUSTOMER_ID: UserId = UserId::new(1);

/// The seeded vendor and the products it owns.
pub const VENDOR_ID: VendorId = VendorId::new(7);

/// Service token the admin tests configure. The backend records it but does
/// not check it.
pub const SERVICE_TOKEN: &str = "svc-Zq8r2LkP0vXw5NbT";

/// One request as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    retry_after: Option<u64>,
    /// Only requests with this method and path trigger the failure.
    route: Option<(String, String)>,
}

impl Failure {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.route
            .as_ref()
            .is_none_or(|(method, path)| *method == request.method && *path == request.path)
    }
}

#[derive(Debug, Clone)]
struct StoredLine {
    owner: String,
    line: CartLine,
}

#[derive(Debug, Clone)]
struct Account {
    profile: CustomerProfile,
    password: String,
}

/// In-memory backend state.
#[derive(Debug)]
pub struct MockState {
    next_id: AtomicI64,
    product_list_hits: AtomicUsize,
    products: Mutex<Vec<Product>>,
    cart: Mutex<Vec<StoredLine>>,
    wishlists: Mutex<HashMap<String, BTreeSet<ProductId>>>,
    orders: Mutex<Vec<Order>>,
    accounts: Mutex<Vec<Account>>,
    vendor: Mutex<VendorProfile>,
    requests: Mutex<Vec<RecordedRequest>>,
    failures: Mutex<Vec<Failure>>,
}

impl MockState {
    fn new(products: Vec<Product>) -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            product_list_hits: AtomicUsize::new(0),
            products: Mutex::new(products),
            cart: Mutex::new(Vec::new()),
            wishlists: Mutex::new(HashMap::new()),
            orders: Mutex::new(Vec::new()),
            accounts: Mutex::new(vec![Account {
                profile: CustomerProfile {
                    id: CUSTOMER_ID,
                    name: "Ada Byron".to_string(),
                    email: Email::parse(CUSTOMER_EMAIL).expect("seed email"),
                    phone: Some("+44 20 7946 0000".to_string()),
                    address: Some(ShippingAddress {
                        street: "12 St James's Square".to_string(),
                        city: "London".to_string(),
                        postal_code: "SW1Y 4JH".to_string(),
                        country: "GB".to_string(),
                    }),
                    role: AccountRole::Customer,
                },
                password: CUSTOMER_PASSWORD.to_string(),
            }]),
            vendor: Mutex::new(VendorProfile {
                id: VENDOR_ID,
                store_name: "Loom & Co".to_string(),
                contact_email: Email::parse("hello@loom.example.com").expect("seed email"),
                phone: None,
                description: None,
            }),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn take_failure(&self, request: &RecordedRequest) -> Option<Failure> {
        let mut failures = self.failures.lock().expect("failures lock");
        let index = failures.iter().position(|f| f.matches(request))?;
        Some(failures.remove(index))
    }
}

/// A running mock backend. The server task stops with the test runtime.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub url: Url,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Start a backend seeded with [`sample_products`].
    pub async fn start() -> Self {
        Self::with_products(sample_products()).await
    }

    pub async fn with_products(products: Vec<Product>) -> Self {
        let state = Arc::new(MockState::new(products));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).expect("mock url"),
            state,
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Requests matching `method` and `path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// How many times `GET /products` was served.
    pub fn product_list_hits(&self) -> usize {
        self.state.product_list_hits.load(Ordering::SeqCst)
    }

    /// Answer the next request with `status` instead of handling it.
    pub fn fail_next(&self, status: u16) {
        self.push_failure(status, None, None);
    }

    /// Answer the next `method path` request with `status`; other requests
    /// are handled normally.
    pub fn fail_next_to(&self, method: &str, path: &str, status: u16) {
        self.push_failure(status, None, Some((method.to_string(), path.to_string())));
    }

    /// Answer the next request with 429 and a `Retry-After` header.
    pub fn rate_limit_next(&self, retry_after: u64) {
        self.push_failure(429, Some(retry_after), None);
    }

    fn push_failure(&self, status: u16, retry_after: Option<u64>, route: Option<(String, String)>) {
        self.state.failures.lock().expect("failures lock").push(Failure {
            status: StatusCode::from_u16(status).expect("valid status"),
            retry_after,
            route,
        });
    }

    /// Cart lines currently stored for `owner` (the `owner` query value).
    pub fn cart_for(&self, owner: &str) -> Vec<CartLine> {
        self.state
            .cart
            .lock()
            .expect("cart lock")
            .iter()
            .filter(|s| s.owner == owner)
            .map(|s| s.line.clone())
            .collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.orders.lock().expect("orders lock").clone()
    }

    /// Insert an order directly, e.g. to set up admin status tests.
    pub fn seed_order(&self, order: Order) {
        self.state.orders.lock().expect("orders lock").push(order);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A small catalog covering every category, with two vendor-owned products.
pub fn sample_products() -> Vec<Product> {
    let rows: [(i64, &str, i64, Category, SubCategory, Gender, u32); 10] = [
        (1, "Court Sneaker", 8999, Category::Shoes, SubCategory::Sneakers, Gender::Unisex, 12),
        (2, "Chelsea Boot", 15900, Category::Shoes, SubCategory::Boots, Gender::Men, 4),
        (3, "Linen Shirt", 4990, Category::Clothing, SubCategory::Shirts, Gender::Men, 30),
        (4, "Wrap Dress", 7900, Category::Clothing, SubCategory::Dresses, Gender::Women, 0),
        (5, "Denim Jacket", 11000, Category::Clothing, SubCategory::Jackets, Gender::Women, 9),
        (6, "Canvas Tote", 2500, Category::Accessories, SubCategory::Bags, Gender::Accessories, 40),
        (7, "Field Watch", 19900, Category::Accessories, SubCategory::Watches, Gender::Men, 2),
        (8, "Bucket Hat", 1999, Category::Accessories, SubCategory::Hats, Gender::Kids, 15),
        (9, "Graphic Tee", 2400, Category::Clothing, SubCategory::TShirts, Gender::Kids, 22),
        (10, "Slim Jeans", 6900, Category::Clothing, SubCategory::Jeans, Gender::Women, 18),
    ];

    rows.into_iter()
        .map(|(id, title, cents, category, sub_category, gender, stock)| {
            let sizes = match category {
                Category::Accessories => [Size::OneSize].into_iter().collect(),
                _ => [Size::S, Size::M, Size::L].into_iter().collect(),
            };
            Product {
                id: ProductId::new(id),
                title: title.to_string(),
                price: Price::from_cents(cents),
                original_price: (id % 3 == 0).then(|| Price::from_cents(cents + 1000)),
                category,
                sub_category,
                gender,
                images: vec![format!("https://cdn.bazaar.test/p/{id}.jpg")],
                sizes,
                colors: vec!["Black".to_string(), "White".to_string()],
                stock,
                new_arrival: id > 6,
                best_seller: id % 2 == 1,
                vendor_id: (id == 3 || id == 6).then_some(VENDOR_ID),
            }
        })
        .collect()
}

/// A guest order for `quantity` of `product` in its first size and color.
pub fn sample_order(id: i64, status: OrderStatus, product: &Product, quantity: u32) -> Order {
    let line = OrderLine {
        product_id: product.id,
        title: product.title.clone(),
        unit_price: product.price,
        size: product.sizes.first().copied().unwrap_or(Size::OneSize),
        color: product.colors.first().cloned().unwrap_or_default(),
        quantity,
    };
    Order {
        id: OrderId::new(id),
        customer_id: None,
        contact: ContactDetails {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: Email::parse("grace@example.com").expect("fixture email"),
            phone: "+1 202 555 0143".to_string(),
        },
        shipping: ShippingAddress {
            street: "1 Navy Yard".to_string(),
            city: "Washington".to_string(),
            postal_code: "20374".to_string(),
            country: "US".to_string(),
        },
        total: line.subtotal(),
        lines: vec![line],
        status,
        payment_method: PaymentMethod::Card,
        placed_at: chrono::Utc::now(),
    }
}

// ============================================================================
// Router
// ============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/images", post(upload_image))
        .route("/cart", get(get_cart).post(add_cart_line).delete(clear_cart))
        .route("/cart/{id}", patch(update_cart_line).delete(remove_cart_line))
        .route("/wishlist", get(get_wishlist).post(add_wishlist))
        .route("/wishlist/{id}", axum::routing::delete(remove_wishlist))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/account/profile", get(get_profile).put(update_profile))
        .route("/vendor/profile", get(get_vendor).put(update_vendor))
        .route("/vendor/products", get(vendor_products))
        .route("/vendor/orders", get(vendor_orders))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    let failure = state.take_failure(&recorded);
    state.requests.lock().expect("requests lock").push(recorded);

    if let Some(failure) = failure {
        let mut response = (failure.status, "injected failure").into_response();
        if let Some(seconds) = failure.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        return response;
    }

    next.run(request).await
}

type Reply<T> = Result<Json<T>, (StatusCode, String)>;

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn bearer_user(
    state: &MockState,
    headers: &HeaderMap,
) -> Result<CustomerProfile, (StatusCode, String)> {
    let unauthorized = || (StatusCode::UNAUTHORIZED, "missing or invalid token".to_string());
    let id: i64 = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer tok-"))
        .and_then(|v| v.parse().ok())
        .ok_or_else(unauthorized)?;
    state
        .accounts
        .lock()
        .expect("accounts lock")
        .iter()
        .find(|a| a.profile.id.as_i64() == id)
        .map(|a| a.profile.clone())
        .ok_or_else(unauthorized)
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(State(state): State<Arc<MockState>>) -> Json<Vec<Product>> {
    state.product_list_hits.fetch_add(1, Ordering::SeqCst);
    Json(state.products.lock().expect("products lock").clone())
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply<Product> {
    state
        .products
        .lock()
        .expect("products lock")
        .iter()
        .find(|p| p.id.as_i64() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("product"))
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    Json(draft): Json<ProductDraft>,
) -> (StatusCode, Json<Product>) {
    let product = draft.into_product(ProductId::new(state.next_id()));
    state.products.lock().expect("products lock").push(product.clone());
    (StatusCode::CREATED, Json(product))
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(draft): Json<ProductDraft>,
) -> Reply<Product> {
    let mut products = state.products.lock().expect("products lock");
    let slot = products
        .iter_mut()
        .find(|p| p.id.as_i64() == id)
        .ok_or_else(|| not_found("product"))?;
    *slot = draft.into_product(ProductId::new(id));
    Ok(Json(slot.clone()))
}

async fn delete_product(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> StatusCode {
    let mut products = state.products.lock().expect("products lock");
    let before = products.len();
    products.retain(|p| p.id.as_i64() != id);
    if products.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn upload_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Reply<Product> {
    let mut file_name = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("image") {
            file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            if bytes.is_empty() {
                return Err((StatusCode::BAD_REQUEST, "empty image".to_string()));
            }
        }
    }
    let file_name = file_name.ok_or((StatusCode::BAD_REQUEST, "missing image part".to_string()))?;

    let mut products = state.products.lock().expect("products lock");
    let product = products
        .iter_mut()
        .find(|p| p.id.as_i64() == id)
        .ok_or_else(|| not_found("product"))?;
    product.images.push(format!("https://cdn.bazaar.test/uploads/{file_name}"));
    Ok(Json(product.clone()))
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Deserialize)]
struct OwnerQuery {
    owner: String,
}

#[derive(Deserialize)]
struct OptionalOwnerQuery {
    owner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLine {
    owner: String,
    product_id: ProductId,
    size: Size,
    color: String,
    quantity: u32,
}

#[derive(Deserialize)]
struct SetQuantity {
    quantity: u32,
}

async fn get_cart(
    State(state): State<Arc<MockState>>,
    Query(q): Query<OwnerQuery>,
) -> Json<Vec<CartLine>> {
    let cart = state.cart.lock().expect("cart lock");
    Json(
        cart.iter()
            .filter(|s| s.owner == q.owner)
            .map(|s| s.line.clone())
            .collect(),
    )
}

async fn add_cart_line(
    State(state): State<Arc<MockState>>,
    Json(body): Json<AddLine>,
) -> Reply<CartLine> {
    let product = state
        .products
        .lock()
        .expect("products lock")
        .iter()
        .find(|p| p.id == body.product_id)
        .cloned()
        .ok_or_else(|| not_found("product"))?;

    // Lines are appended as sent; merging identical variants is the client's job.
    let line = CartLine {
        id: CartLineId::new(state.next_id()),
        product_id: product.id,
        title: product.title.clone(),
        unit_price: product.price,
        image: product.images.first().cloned(),
        size: body.size,
        color: body.color,
        quantity: body.quantity,
    };
    state.cart.lock().expect("cart lock").push(StoredLine {
        owner: body.owner,
        line: line.clone(),
    });
    Ok(Json(line))
}

async fn update_cart_line(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<SetQuantity>,
) -> Reply<CartLine> {
    let mut cart = state.cart.lock().expect("cart lock");
    let stored = cart
        .iter_mut()
        .find(|s| s.line.id.as_i64() == id)
        .ok_or_else(|| not_found("cart line"))?;
    stored.line.quantity = body.quantity;
    Ok(Json(stored.line.clone()))
}

async fn remove_cart_line(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> StatusCode {
    state
        .cart
        .lock()
        .expect("cart lock")
        .retain(|s| s.line.id.as_i64() != id);
    StatusCode::NO_CONTENT
}

async fn clear_cart(State(state): State<Arc<MockState>>, Query(q): Query<OwnerQuery>) -> StatusCode {
    state
        .cart
        .lock()
        .expect("cart lock")
        .retain(|s| s.owner != q.owner);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Wishlist
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistBody {
    owner: String,
    product_id: ProductId,
}

async fn get_wishlist(
    State(state): State<Arc<MockState>>,
    Query(q): Query<OwnerQuery>,
) -> Json<serde_json::Value> {
    let wishlists = state.wishlists.lock().expect("wishlists lock");
    let entries: Vec<_> = wishlists
        .get(&q.owner)
        .into_iter()
        .flatten()
        .map(|id| json!({ "productId": id }))
        .collect();
    Json(json!(entries))
}

async fn add_wishlist(
    State(state): State<Arc<MockState>>,
    Json(body): Json<WishlistBody>,
) -> StatusCode {
    state
        .wishlists
        .lock()
        .expect("wishlists lock")
        .entry(body.owner)
        .or_default()
        .insert(body.product_id);
    StatusCode::CREATED
}

async fn remove_wishlist(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Query(q): Query<OwnerQuery>,
) -> StatusCode {
    if let Some(set) = state.wishlists.lock().expect("wishlists lock").get_mut(&q.owner) {
        set.remove(&ProductId::new(id));
    }
    StatusCode::NO_CONTENT
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    Json(new_order): Json<NewOrder>,
) -> Reply<Order> {
    if new_order.lines.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "order has no lines".to_string()));
    }
    let order = Order {
        id: OrderId::new(state.next_id()),
        customer_id: new_order.customer_id,
        contact: new_order.contact,
        shipping: new_order.shipping,
        lines: new_order.lines,
        status: OrderStatus::Pending,
        payment_method: new_order.payment_method,
        total: new_order.total,
        placed_at: chrono::Utc::now(),
    };
    state.orders.lock().expect("orders lock").push(order.clone());
    Ok(Json(order))
}

async fn list_orders(
    State(state): State<Arc<MockState>>,
    Query(q): Query<OptionalOwnerQuery>,
) -> Json<Vec<Order>> {
    let orders = state.orders.lock().expect("orders lock");
    let user = q
        .owner
        .as_deref()
        .and_then(|o| o.strip_prefix("user:"))
        .and_then(|id| id.parse::<i64>().ok());
    Json(
        orders
            .iter()
            .filter(|o| match (&q.owner, user) {
                (None, _) => true,
                (Some(_), Some(id)) => o.customer_id.map(|c| c.as_i64()) == Some(id),
                (Some(_), None) => false,
            })
            .cloned()
            .collect(),
    )
}

async fn get_order(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Reply<Order> {
    state
        .orders
        .lock()
        .expect("orders lock")
        .iter()
        .find(|o| o.id.as_i64() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("order"))
}

/// Stores whatever status it is sent; the console enforces the machine.
async fn update_order_status(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Reply<Order> {
    let mut orders = state.orders.lock().expect("orders lock");
    let order = orders
        .iter_mut()
        .find(|o| o.id.as_i64() == id)
        .ok_or_else(|| not_found("order"))?;
    order.status = body.status;
    Ok(Json(order.clone()))
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct ProfileBody {
    name: String,
    phone: Option<String>,
    address: Option<ShippingAddress>,
}

fn auth_response(profile: &CustomerProfile) -> Json<serde_json::Value> {
    Json(json!({ "token": format!("tok-{}", profile.id), "user": profile }))
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<LoginBody>,
) -> Reply<serde_json::Value> {
    let accounts = state.accounts.lock().expect("accounts lock");
    accounts
        .iter()
        .find(|a| a.profile.email.as_str() == body.email && a.password == body.password)
        .map(|a| auth_response(&a.profile))
        .ok_or((StatusCode::UNAUTHORIZED, "invalid credentials".to_string()))
}

async fn register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<RegisterBody>,
) -> Reply<serde_json::Value> {
    let email = Email::parse(&body.email).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let mut accounts = state.accounts.lock().expect("accounts lock");
    if accounts.iter().any(|a| a.profile.email == email) {
        return Err((StatusCode::CONFLICT, "Email already registered".to_string()));
    }
    let profile = CustomerProfile {
        id: UserId::new(state.next_id()),
        name: body.name,
        email,
        phone: None,
        address: None,
        role: AccountRole::Customer,
    };
    accounts.push(Account {
        profile: profile.clone(),
        password: body.password,
    });
    Ok(auth_response(&profile))
}

async fn get_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Reply<CustomerProfile> {
    bearer_user(&state, &headers).map(Json)
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<ProfileBody>,
) -> Reply<CustomerProfile> {
    let user = bearer_user(&state, &headers)?;
    let mut accounts = state.accounts.lock().expect("accounts lock");
    let account = accounts
        .iter_mut()
        .find(|a| a.profile.id == user.id)
        .ok_or_else(|| not_found("account"))?;
    account.profile.name = body.name;
    account.profile.phone = body.phone;
    account.profile.address = body.address;
    Ok(Json(account.profile.clone()))
}

// ============================================================================
// Vendor
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorBody {
    store_name: String,
    contact_email: Email,
    phone: Option<String>,
    description: Option<String>,
}

async fn get_vendor(State(state): State<Arc<MockState>>) -> Json<VendorProfile> {
    Json(state.vendor.lock().expect("vendor lock").clone())
}

async fn update_vendor(
    State(state): State<Arc<MockState>>,
    Json(body): Json<VendorBody>,
) -> Json<VendorProfile> {
    let mut vendor = state.vendor.lock().expect("vendor lock");
    vendor.store_name = body.store_name;
    vendor.contact_email = body.contact_email;
    vendor.phone = body.phone;
    vendor.description = body.description;
    Json(vendor.clone())
}

async fn vendor_products(State(state): State<Arc<MockState>>) -> Json<Vec<Product>> {
    let products = state.products.lock().expect("products lock");
    Json(
        products
            .iter()
            .filter(|p| p.vendor_id == Some(VENDOR_ID))
            .cloned()
            .collect(),
    )
}

async fn vendor_orders(State(state): State<Arc<MockState>>) -> Json<Vec<Order>> {
    let owned: BTreeSet<ProductId> = state
        .products
        .lock()
        .expect("products lock")
        .iter()
        .filter(|p| p.vendor_id == Some(VENDOR_ID))
        .map(|p| p.id)
        .collect();
    let orders = state.orders.lock().expect("orders lock");
    Json(
        orders
            .iter()
            .filter(|o| owned.iter().any(|id| o.contains_product(*id)))
            .cloned()
            .collect(),
    )
}

//! Orders: frozen snapshots of a cart at purchase time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::email::Email;
use super::id::{OrderId, ProductId, UserId};
use super::price::Price;
use super::product::Size;
use super::status::{OrderStatus, PaymentMethod};

/// Who to contact about the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
}

impl ContactDetails {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Where to ship the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// A purchased line. Title and price are captured, not re-derived from the
/// catalog, so later product edits never change past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub size: Size,
    pub color: String,
    pub quantity: u32,
}

impl OrderLine {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            unit_price: line.unit_price,
            size: line.size,
            color: line.color.clone(),
            quantity: line.quantity,
        }
    }
}

/// Order payload sent at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub customer_id: Option<UserId>,
    pub contact: ContactDetails,
    pub shipping: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub total: Price,
}

impl NewOrder {
    /// Snapshot cart lines into an order, computing the total from the snapshot.
    #[must_use]
    pub fn from_cart(
        customer_id: Option<UserId>,
        contact: ContactDetails,
        shipping: ShippingAddress,
        lines: &[CartLine],
        payment_method: PaymentMethod,
    ) -> Self {
        let lines: Vec<OrderLine> = lines.iter().map(OrderLine::from).collect();
        let total = lines.iter().map(OrderLine::subtotal).sum();
        Self {
            customer_id,
            contact,
            shipping,
            lines,
            payment_method,
            total,
        }
    }
}

/// A placed order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<UserId>,
    pub contact: ContactDetails,
    pub shipping: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Whether any line is for `product_id`.
    #[must_use]
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.lines.iter().any(|l| l.product_id == product_id)
    }
}

//! Cart aggregate.
//!
//! The cart owns its lines and only exposes the add / update / remove / clear
//! operations; totals are derived on every read and never stored.

use serde::{Deserialize, Serialize};

use super::id::{CartLineId, ProductId};
use super::price::Price;
use super::product::{Product, Size};

/// Errors rejecting a cart operation before anything changes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("please select a size")]
    MissingSize,
    #[error("please select a color")]
    MissingColor,
    #[error("size {size} is not available for {title}")]
    SizeUnavailable { title: String, size: Size },
    #[error("color {color} is not available for {title}")]
    ColorUnavailable { title: String, color: String },
    #[error("{0} is out of stock")]
    OutOfStock(String),
}

/// One line of the cart: a product in a chosen size and color.
///
/// Title, unit price and image are captured when the line is created so the
/// cart renders without the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    #[serde(default)]
    pub image: Option<String>,
    pub size: Size,
    pub color: String,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Whether this line holds the same variant.
    #[must_use]
    pub fn same_variant(&self, product_id: ProductId, size: Size, color: &str) -> bool {
        self.product_id == product_id
            && self.size == size
            && self.color.trim().eq_ignore_ascii_case(color.trim())
    }
}

/// A validated add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSelection {
    pub product_id: ProductId,
    pub size: Size,
    pub color: String,
}

impl CartSelection {
    /// Check a size/color choice against the product.
    ///
    /// # Errors
    ///
    /// Rejects missing selections, variants the product does not offer, and
    /// products with no stock.
    pub fn new(product: &Product, size: Option<Size>, color: &str) -> Result<Self, CartError> {
        let size = size.ok_or(CartError::MissingSize)?;
        let color = color.trim();
        if color.is_empty() {
            return Err(CartError::MissingColor);
        }
        if !product.has_size(size) {
            return Err(CartError::SizeUnavailable {
                title: product.title.clone(),
                size,
            });
        }
        if !product.has_color(color) {
            return Err(CartError::ColorUnavailable {
                title: product.title.clone(),
                color: color.to_string(),
            });
        }
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.title.clone()));
        }
        Ok(Self {
            product_id: product.id,
            size,
            color: color.to_string(),
        })
    }
}

/// Outcome of [`Cart::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Added(CartLineId),
    /// An existing line with the same variant was incremented.
    Merged(CartLineId),
}

impl AddOutcome {
    #[must_use]
    pub const fn line_id(&self) -> CartLineId {
        match self {
            Self::Added(id) | Self::Merged(id) => *id,
        }
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from lines returned by the server.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Find the line holding a variant, if any.
    #[must_use]
    pub fn find_variant(&self, selection: &CartSelection) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.same_variant(selection.product_id, selection.size, &selection.color))
    }

    /// Add one unit of a product variant.
    ///
    /// Merges into an existing line with the same product, size and color.
    ///
    /// # Errors
    ///
    /// See [`CartSelection::new`].
    pub fn add_item(
        &mut self,
        product: &Product,
        size: Option<Size>,
        color: &str,
    ) -> Result<AddOutcome, CartError> {
        let selection = CartSelection::new(product, size, color)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.same_variant(selection.product_id, selection.size, &selection.color))
        {
            line.quantity = line.quantity.saturating_add(1);
            return Ok(AddOutcome::Merged(line.id));
        }

        let id = self.next_line_id();
        self.lines.push(CartLine {
            id,
            product_id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            image: product.primary_image().map(str::to_string),
            size: selection.size,
            color: selection.color,
            quantity: 1,
        });
        Ok(AddOutcome::Added(id))
    }

    /// Set a line's quantity. Quantities below 1 are ignored.
    ///
    /// Returns `true` if a line changed.
    pub fn update_quantity(&mut self, id: CartLineId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `true` if it existed.
    pub fn remove_item(&mut self, id: CartLineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() < before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Record a line as the server returned it, replacing any line with the
    /// same id.
    pub fn upsert_line(&mut self, line: CartLine) {
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }
    }

    /// Sum of `unit_price × quantity` over all lines, exact.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn next_line_id(&self) -> CartLineId {
        let max = self.lines.iter().map(|l| l.id.as_i64()).max().unwrap_or(0);
        CartLineId::new(max + 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::{Category, Gender, SubCategory};

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            original_price: None,
            category: Category::Clothing,
            sub_category: SubCategory::Shirts,
            gender: Gender::Women,
            images: vec![format!("/img/{id}.jpg")],
            sizes: [Size::S, Size::M, Size::L].into_iter().collect(),
            colors: vec!["Red".to_string(), "Blue".to_string()],
            stock: 10,
            new_arrival: false,
            best_seller: false,
            vendor_id: None,
        }
    }

    #[test]
    fn test_requires_size_and_color() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        assert_eq!(cart.add_item(&p, None, "Red"), Err(CartError::MissingSize));
        assert_eq!(
            cart.add_item(&p, Some(Size::M), "  "),
            Err(CartError::MissingColor)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_rejects_unavailable_variants() {
        let mut cart = Cart::new();
        let mut p = product(1, 1000);
        assert!(matches!(
            cart.add_item(&p, Some(Size::Xxl), "Red"),
            Err(CartError::SizeUnavailable { .. })
        ));
        assert!(matches!(
            cart.add_item(&p, Some(Size::M), "Green"),
            Err(CartError::ColorUnavailable { .. })
        ));
        p.stock = 0;
        assert!(matches!(
            cart.add_item(&p, Some(Size::M), "Red"),
            Err(CartError::OutOfStock(_))
        ));
    }

    #[test]
    fn test_identical_variant_merges() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        let first = cart.add_item(&p, Some(Size::M), "Red").unwrap();
        let second = cart.add_item(&p, Some(Size::M), "red").unwrap();
        assert!(matches!(first, AddOutcome::Added(_)));
        assert_eq!(second, AddOutcome::Merged(first.line_id()));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.count(), 2);

        cart.add_item(&p, Some(Size::L), "Red").unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_update_quantity_ignores_zero() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(&product(1, 1000), Some(Size::S), "Blue")
            .unwrap()
            .line_id();
        assert!(!cart.update_quantity(id, 0));
        assert_eq!(cart.line(id).unwrap().quantity, 1);
        assert!(cart.update_quantity(id, 5));
        assert_eq!(cart.line(id).unwrap().quantity, 5);
        assert!(!cart.update_quantity(CartLineId::new(99), 3));
    }

    #[test]
    fn test_totals_follow_every_operation() {
        let mut cart = Cart::new();
        let a = product(1, 8999);
        let b = product(2, 1250);

        let line_a = cart.add_item(&a, Some(Size::M), "Red").unwrap().line_id();
        cart.update_quantity(line_a, 2);
        assert_eq!(cart.line(line_a).unwrap().subtotal().to_fixed(), "179.98");

        let line_b = cart.add_item(&b, Some(Size::S), "Blue").unwrap().line_id();
        cart.update_quantity(line_b, 3);

        let expected: Price = cart.lines().iter().map(|l| l.unit_price.times(l.quantity)).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total(), Price::from_cents(17998 + 3750));
        assert_eq!(cart.count(), 5);

        assert!(cart.remove_item(line_a));
        assert_eq!(cart.total(), Price::from_cents(3750));
        assert!(!cart.remove_item(line_a));

        cart.clear();
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_upsert_line_replaces_by_id() {
        let mut cart = Cart::new();
        let id = cart.add_item(&product(1, 500), Some(Size::M), "Red").unwrap().line_id();

        let mut server_line = cart.line(id).unwrap().clone();
        server_line.quantity = 4;
        cart.upsert_line(server_line);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.count(), 4);

        let mut other = cart.line(id).unwrap().clone();
        other.id = CartLineId::new(42);
        other.color = "Blue".to_string();
        other.quantity = 1;
        cart.upsert_line(other);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total(), Price::from_cents(2500));
    }

    #[test]
    fn test_line_ids_stay_unique_after_removal() {
        let mut cart = Cart::new();
        let first = cart.add_item(&product(1, 100), Some(Size::S), "Red").unwrap().line_id();
        let second = cart.add_item(&product(2, 100), Some(Size::S), "Red").unwrap().line_id();
        cart.remove_item(first);
        let third = cart.add_item(&product(3, 100), Some(Size::S), "Red").unwrap().line_id();
        assert_ne!(second, third);
    }
}

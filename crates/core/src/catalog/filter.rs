//! Product filtering and sorting.
//!
//! [`ProductQuery::apply`] derives the visible product sequence from the full
//! catalog. It borrows the catalog and returns a fresh ordered `Vec`; the input
//! slice is never reordered or modified.

use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, Size, SubCategory};

/// Slug of the one department that only ever matches on category.
const ACCESSORIES: &str = "accessories";

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Highest id first; ids are assigned in creation order.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        let newest = b.id.cmp(&a.id);
        match self {
            Self::Newest => newest,
            Self::PriceAsc => a.price.cmp(&b.price).then(newest),
            Self::PriceDesc => b.price.cmp(&a.price).then(newest),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "newest" => Ok(Self::Newest),
            "price-asc" | "price_asc" | "low-high" => Ok(Self::PriceAsc),
            "price-desc" | "price_desc" | "high-low" => Ok(Self::PriceDesc),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// Closed price interval. `max: None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Option<Price>,
}

impl PriceRange {
    #[must_use]
    pub const fn between(min: Price, max: Price) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn at_least(min: Price) -> Self {
        Self { min, max: None }
    }

    /// Inclusive on both ends. An inverted range contains nothing.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min == Price::ZERO && self.max.is_none()
    }
}

/// Category-or-department constraint from the storefront navigation.
///
/// Matches a product whose category slug or gender slug equals the constraint,
/// except `accessories`, which matches on category alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryConstraint(String);

impl CategoryConstraint {
    #[must_use]
    pub fn new(slug: &str) -> Self {
        Self(slug.trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if product.category.slug() == self.0 {
            return true;
        }
        self.0 != ACCESSORIES && product.gender.slug() == self.0
    }
}

/// Filter and sort state for a product listing.
///
/// Every constraint defaults to inactive, so `ProductQuery::default()` keeps
/// every product in newest-first order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<CategoryConstraint>,
    pub sub_category: Option<SubCategory>,
    pub price: PriceRange,
    /// Any-match; compared case-insensitively.
    pub colors: BTreeSet<String>,
    /// Any-match.
    pub sizes: BTreeSet<Size>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub in_stock_only: bool,
    pub sort: SortKey,
}

impl ProductQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, slug: &str) -> Self {
        self.category = Some(CategoryConstraint::new(slug));
        self
    }

    #[must_use]
    pub const fn sub_category(mut self, sub_category: SubCategory) -> Self {
        self.sub_category = Some(sub_category);
        self
    }

    #[must_use]
    pub const fn price(mut self, range: PriceRange) -> Self {
        self.price = range;
        self
    }

    #[must_use]
    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.colors = colors
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn sizes(mut self, sizes: impl IntoIterator<Item = Size>) -> Self {
        self.sizes = sizes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_lowercase());
        self
    }

    #[must_use]
    pub const fn in_stock_only(mut self, in_stock_only: bool) -> Self {
        self.in_stock_only = in_stock_only;
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `product` satisfies every active constraint.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.price.contains(product.price)
            && (self.colors.is_empty() || self.colors.iter().any(|c| product.has_color(c)))
            && (self.sizes.is_empty() || self.sizes.iter().any(|s| product.has_size(*s)))
            && self.category.as_ref().is_none_or(|c| c.matches(product))
            && self.sub_category.is_none_or(|s| product.sub_category == s)
            && self
                .search
                .as_ref()
                .is_none_or(|term| product.title.to_lowercase().contains(term.as_str()))
            && (!self.in_stock_only || product.in_stock())
    }

    /// Filter then sort. The result borrows from `products`.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut visible: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }

    /// Whether any filter (not counting sort) is active.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.category.is_some()
            || self.sub_category.is_some()
            || !self.price.is_unbounded()
            || !self.colors.is_empty()
            || !self.sizes.is_empty()
            || self.search.is_some()
            || self.in_stock_only
    }
}

/// Newest products flagged as new arrivals.
#[must_use]
pub fn new_arrivals(products: &[Product], limit: usize) -> Vec<&Product> {
    flagged(products, limit, |p| p.new_arrival)
}

/// Newest products flagged as best sellers.
#[must_use]
pub fn best_sellers(products: &[Product], limit: usize) -> Vec<&Product> {
    flagged(products, limit, |p| p.best_seller)
}

/// Other products in the same category, newest first.
#[must_use]
pub fn related<'a>(products: &'a [Product], to: &Product, limit: usize) -> Vec<&'a Product> {
    flagged(products, limit, |p| p.id != to.id && p.category == to.category)
}

fn flagged(products: &[Product], limit: usize, keep: impl Fn(&Product) -> bool) -> Vec<&Product> {
    let mut picked: Vec<&Product> = products.iter().filter(|p| keep(p)).collect();
    picked.sort_by(|a, b| SortKey::Newest.compare(a, b));
    picked.truncate(limit);
    picked
}

/// Distinct colors offered across `products`, for the filter sidebar.
///
/// Deduplicated case-insensitively, keeping the first spelling seen, sorted
/// alphabetically.
#[must_use]
pub fn available_colors(products: &[Product]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut colors = Vec::new();
    for color in products.iter().flat_map(|p| p.colors.iter()) {
        let color = color.trim();
        if !color.is_empty() && seen.insert(color.to_ascii_lowercase()) {
            colors.push(color.to_string());
        }
    }
    colors.sort_by_key(|c| c.to_ascii_lowercase());
    colors
}

/// Lowest and highest price across `products`.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<(Price, Price)> {
    let min = products.iter().map(|p| p.price).min()?;
    let max = products.iter().map(|p| p.price).max()?;
    Some((min, max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Category, Gender, ProductId};

    fn product(id: i64, cents: i64, category: Category, gender: Gender) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Item {id}"),
            price: Price::from_cents(cents),
            original_price: None,
            category,
            sub_category: SubCategory::Shirts,
            gender,
            images: Vec::new(),
            sizes: [Size::M].into_iter().collect(),
            colors: vec!["Black".to_string()],
            stock: 1,
            new_arrival: false,
            best_seller: false,
            vendor_id: None,
        }
    }

    fn catalog() -> Vec<Product> {
        let mut products = vec![
            product(1, 2500, Category::Clothing, Gender::Men),
            product(2, 9000, Category::Clothing, Gender::Women),
            product(3, 4500, Category::Shoes, Gender::Women),
            product(4, 1500, Category::Accessories, Gender::Unisex),
            product(5, 7000, Category::Clothing, Gender::Accessories),
            product(6, 4500, Category::Shoes, Gender::Men),
        ];
        products[0].colors = vec!["Red".to_string(), "White".to_string()];
        products[1].sizes = [Size::S, Size::L].into_iter().collect();
        products[2].colors = vec!["red".to_string()];
        products[3].sizes = [Size::OneSize].into_iter().collect();
        products[4].new_arrival = true;
        products[5].new_arrival = true;
        products[5].best_seller = true;
        products[5].stock = 0;
        products
    }

    fn ids(products: &[&Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_empty_query_is_identity_newest_first() {
        let products = catalog();
        let before = products.clone();
        let visible = ProductQuery::default().apply(&products);
        assert_eq!(ids(&visible), vec![6, 5, 4, 3, 2, 1]);
        assert_eq!(products, before, "input must not be reordered");
    }

    #[test]
    fn test_result_is_exactly_the_matching_products() {
        let products = catalog();
        let queries = [
            ProductQuery::new().price(PriceRange::between(
                Price::from_cents(2500),
                Price::from_cents(4500),
            )),
            ProductQuery::new().colors(["RED"]),
            ProductQuery::new().sizes([Size::S, Size::OneSize]),
            ProductQuery::new().category("women"),
            ProductQuery::new().category("shoes").colors(["red", "black"]),
            ProductQuery::new().search("item 2"),
            ProductQuery::new().in_stock_only(true),
        ];
        for query in queries {
            let visible = query.apply(&products);
            for p in &products {
                assert_eq!(
                    visible.iter().any(|v| v.id == p.id),
                    query.matches(p),
                    "{query:?} / product {}",
                    p.id
                );
            }
        }
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let products = catalog();
        let visible = ProductQuery::new()
            .price(PriceRange::between(
                Price::from_cents(4500),
                Price::from_cents(7000),
            ))
            .apply(&products);
        assert_eq!(ids(&visible), vec![6, 5, 3]);
    }

    #[test]
    fn test_colors_and_sizes_are_any_match() {
        let products = catalog();
        assert_eq!(
            ids(&ProductQuery::new().colors(["red"]).apply(&products)),
            vec![3, 1]
        );
        assert_eq!(
            ids(&ProductQuery::new().sizes([Size::L, Size::OneSize]).apply(&products)),
            vec![4, 2]
        );
    }

    #[test]
    fn test_category_matches_category_or_gender() {
        let products = catalog();
        assert_eq!(
            ids(&ProductQuery::new().category("Women").apply(&products)),
            vec![3, 2]
        );
        assert_eq!(
            ids(&ProductQuery::new().category("shoes").apply(&products)),
            vec![6, 3]
        );
    }

    #[test]
    fn test_accessories_matches_category_only() {
        let products = catalog();
        let visible = ProductQuery::new().category("accessories").apply(&products);
        // Product 5 is merchandised under the accessories department but its
        // category is clothing.
        assert_eq!(ids(&visible), vec![4]);
    }

    #[test]
    fn test_narrowing_equals_combined_query() {
        let products = catalog();
        let broad = ProductQuery::new().category("women");
        let narrow = ProductQuery::new().colors(["red"]);
        let combined = ProductQuery::new().category("women").colors(["red"]);

        let first_pass: Vec<Product> = broad.apply(&products).into_iter().cloned().collect();
        let twice = narrow.apply(&first_pass);
        let once = combined.apply(&products);
        assert_eq!(ids(&twice), ids(&once));
    }

    #[test]
    fn test_sorts() {
        let products = catalog();
        assert_eq!(
            ids(&ProductQuery::new().sort(SortKey::PriceAsc).apply(&products)),
            vec![4, 1, 6, 3, 5, 2]
        );
        assert_eq!(
            ids(&ProductQuery::new().sort(SortKey::PriceDesc).apply(&products)),
            vec![2, 5, 6, 3, 1, 4]
        );
    }

    #[test]
    fn test_empty_result_is_valid() {
        let products = catalog();
        let visible = ProductQuery::new().colors(["chartreuse"]).apply(&products);
        assert!(visible.is_empty());
        assert!(ProductQuery::default().apply(&[]).is_empty());
    }

    #[test]
    fn test_has_filters_ignores_sort() {
        assert!(!ProductQuery::new().sort(SortKey::PriceDesc).has_filters());
        assert!(ProductQuery::new().sizes([Size::M]).has_filters());
    }

    #[test]
    fn test_rails() {
        let products = catalog();
        assert_eq!(ids(&new_arrivals(&products, 10)), vec![6, 5]);
        assert_eq!(ids(&best_sellers(&products, 10)), vec![6]);
        assert_eq!(ids(&related(&products, &products[1], 2)), vec![5, 1]);
    }

    #[test]
    fn test_facets() {
        let products = catalog();
        assert_eq!(available_colors(&products), vec!["Black", "Red", "White"]);
        assert_eq!(
            price_bounds(&products),
            Some((Price::from_cents(1500), Price::from_cents(9000)))
        );
        assert_eq!(price_bounds(&[]), None);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("price-asc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::Newest);
        assert!("oldest".parse::<SortKey>().is_err());
    }
}

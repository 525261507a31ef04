//! Dashboard summary: order counts, delivered revenue and low stock.

use std::collections::BTreeMap;

use bazaar_core::{Order, OrderStatus, Price, Product};
use tracing::instrument;

use crate::error::Result;
use crate::state::Admin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Every status, including those with no orders.
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    pub total_orders: usize,
    /// Sum of delivered order totals.
    pub revenue: Price,
    /// Products at or below the threshold, lowest stock first.
    pub low_stock: Vec<Product>,
}

impl DashboardSummary {
    #[must_use]
    pub fn build(orders: &[Order], products: &[Product], low_stock_threshold: u32) -> Self {
        let mut orders_by_status: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for order in orders {
            *orders_by_status.entry(order.status).or_default() += 1;
        }

        let revenue: Price = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .map(|o| o.total)
            .sum();

        let mut low_stock: Vec<Product> = products
            .iter()
            .filter(|p| p.stock <= low_stock_threshold)
            .cloned()
            .collect();
        low_stock.sort_by_key(|p| (p.stock, p.id));

        Self {
            orders_by_status,
            total_orders: orders.len(),
            revenue,
            low_stock,
        }
    }

    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.orders_by_status.get(&status).copied().unwrap_or_default()
    }
}

impl Admin {
    /// Marketplace-wide summary.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        let (orders, products) = tokio::try_join!(self.orders(), self.products())?;
        Ok(DashboardSummary::build(
            &orders,
            &products,
            self.config().low_stock_threshold,
        ))
    }

    /// Summary over the signed-in vendor's orders and products.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    #[instrument(skip(self))]
    pub async fn vendor_dashboard(&self) -> Result<DashboardSummary> {
        let (orders, products) = tokio::try_join!(self.vendor_orders(), self.vendor_products())?;
        Ok(DashboardSummary::build(
            &orders,
            &products,
            self.config().low_stock_threshold,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{
        Category, ContactDetails, Email, Gender, OrderId, PaymentMethod, ProductId,
        ShippingAddress, Size, SubCategory,
    };
    use chrono::Utc;

    fn order(id: i64, status: OrderStatus, cents: i64) -> Order {
        Order {
            id: OrderId::new(id),
            customer_id: None,
            contact: ContactDetails {
                first_name: "Ada".to_string(),
                last_name: "Byron".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                phone: "5550100200".to_string(),
            },
            shipping: ShippingAddress {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            },
            lines: Vec::new(),
            status,
            payment_method: PaymentMethod::Card,
            total: Price::from_cents(cents),
            placed_at: Utc::now(),
        }
    }

    fn product(id: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(1000),
            original_price: None,
            category: Category::Accessories,
            sub_category: SubCategory::Hats,
            gender: Gender::Accessories,
            images: vec!["a.jpg".to_string()],
            sizes: [Size::OneSize].into_iter().collect(),
            colors: vec!["Black".to_string()],
            stock,
            new_arrival: false,
            best_seller: false,
            vendor_id: None,
        }
    }

    #[test]
    fn test_summary() {
        let orders = vec![
            order(1, OrderStatus::Delivered, 8999),
            order(2, OrderStatus::Delivered, 1001),
            order(3, OrderStatus::Pending, 50000),
            order(4, OrderStatus::Cancelled, 2000),
        ];
        let products = vec![product(1, 12), product(2, 0), product(3, 5), product(4, 3)];

        let summary = DashboardSummary::build(&orders, &products, 5);
        assert_eq!(summary.total_orders, 4);
        assert_eq!(summary.count(OrderStatus::Delivered), 2);
        assert_eq!(summary.count(OrderStatus::Shipped), 0);
        assert_eq!(summary.orders_by_status.len(), 5);
        assert_eq!(summary.revenue, Price::from_cents(10000));

        let low: Vec<i64> = summary.low_stock.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(low, vec![2, 4, 3]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::build(&[], &[], 5);
        assert_eq!(summary.revenue, Price::ZERO);
        assert!(summary.low_stock.is_empty());
    }
}

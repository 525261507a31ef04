//! Order desk: status options and status updates under a transition policy.

use std::fmt;
use std::str::FromStr;

use bazaar_api::ApiError;
use bazaar_api::telemetry::add_breadcrumb;
use bazaar_core::{Order, OrderId, OrderStatus, StatusTransitionError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{AdminError, Result};
use crate::state::Admin;

/// Which status changes the console allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Only legal next statuses.
    #[default]
    Enforced,
    /// Any status, including moves out of terminal states.
    Permissive,
}

impl TransitionPolicy {
    /// Statuses offered for an order currently at `current`.
    #[must_use]
    pub fn options(self, current: OrderStatus) -> Vec<OrderStatus> {
        match self {
            Self::Enforced => current.next_statuses().to_vec(),
            Self::Permissive => OrderStatus::ALL
                .into_iter()
                .filter(|s| *s != current)
                .collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] if the policy forbids the change.
    pub fn check(
        self,
        from: OrderStatus,
        to: OrderStatus,
    ) -> std::result::Result<(), StatusTransitionError> {
        match self {
            Self::Enforced => from.transition_to(to).map(|_| ()),
            Self::Permissive => Ok(()),
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforced => write!(f, "enforced"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforced" | "strict" => Ok(Self::Enforced),
            "permissive" | "any" => Ok(Self::Permissive),
            other => Err(format!("expected enforced or permissive, got {other}")),
        }
    }
}

impl Admin {
    /// Every order in the marketplace.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.api().list_orders(None).await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no order has this id, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<Order> {
        match self.api().get_order(id).await {
            Ok(order) => Ok(order),
            Err(ApiError::NotFound(_)) => Err(AdminError::NotFound(format!("order {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Statuses to offer in the order's status picker.
    #[must_use]
    pub fn status_options(&self, order: &Order) -> Vec<OrderStatus> {
        self.config().status_policy.options(order.status)
    }

    /// Move an order to `to` if the configured policy allows it.
    ///
    /// The current status is re-read from the backend first so the check
    /// never runs against a stale row.
    ///
    /// # Errors
    ///
    /// Returns a transition error without sending the update, `NotFound` for
    /// an unknown order, or an API error.
    #[instrument(skip(self), fields(order_id = %id, to = %to))]
    pub async fn update_order_status(&self, id: OrderId, to: OrderStatus) -> Result<Order> {
        let current = self.order(id).await?;
        self.apply_status(&current, to).await
    }

    pub(crate) async fn apply_status(&self, current: &Order, to: OrderStatus) -> Result<Order> {
        let policy = self.config().status_policy;
        if let Err(e) = policy.check(current.status, to) {
            warn!(order_id = %current.id, from = %current.status, to = %to, "Status change refused");
            return Err(e.into());
        }

        let updated = self.api().update_order_status(current.id, to).await?;
        info!(
            order_id = %current.id,
            from = %current.status,
            to = %updated.status,
            %policy,
            "Order status updated"
        );

        let order_id = current.id.to_string();
        add_breadcrumb(
            "orders",
            "Updated order status",
            Some(&[("order_id", order_id.as_str()), ("status", to.as_str())]),
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enforced_options_follow_the_machine() {
        let policy = TransitionPolicy::Enforced;
        assert_eq!(
            policy.options(OrderStatus::Pending),
            vec![OrderStatus::Processing, OrderStatus::Cancelled]
        );
        assert!(policy.options(OrderStatus::Delivered).is_empty());
        assert!(policy.options(OrderStatus::Cancelled).is_empty());
    }

    #[test]
    fn test_enforced_check() {
        let policy = TransitionPolicy::Enforced;
        assert!(policy.check(OrderStatus::Shipped, OrderStatus::Delivered).is_ok());
        assert!(policy.check(OrderStatus::Processing, OrderStatus::Cancelled).is_ok());

        let err = policy
            .check(OrderStatus::Delivered, OrderStatus::Pending)
            .unwrap_err();
        assert_eq!(err.from, OrderStatus::Delivered);
        assert_eq!(err.to, OrderStatus::Pending);
        assert!(policy.check(OrderStatus::Pending, OrderStatus::Shipped).is_err());
    }

    #[test]
    fn test_permissive_allows_anything() {
        let policy = TransitionPolicy::Permissive;
        assert!(policy.check(OrderStatus::Delivered, OrderStatus::Pending).is_ok());
        assert_eq!(policy.options(OrderStatus::Cancelled).len(), 4);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "Permissive".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Permissive
        );
        assert_eq!(
            " enforced ".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Enforced
        );
        assert!("lenient".parse::<TransitionPolicy>().is_err());
        assert_eq!(TransitionPolicy::Permissive.to_string(), "permissive");
    }
}

//! Wishlist: a set of product ids.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

impl WishlistChange {
    /// The change that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    ids: HashSet<ProductId>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Add the product if absent, remove it if present.
    pub fn toggle(&mut self, id: ProductId) -> WishlistChange {
        if self.ids.remove(&id) {
            WishlistChange::Removed
        } else {
            self.ids.insert(id);
            WishlistChange::Added
        }
    }

    /// Apply a change explicitly (used to roll back a failed toggle).
    pub fn apply(&mut self, id: ProductId, change: WishlistChange) {
        match change {
            WishlistChange::Added => {
                self.ids.insert(id);
            }
            WishlistChange::Removed => {
                self.ids.remove(&id);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Product ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<_> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<ProductId> for Wishlist {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut wishlist: Wishlist = [ProductId::new(1)].into_iter().collect();

        for id in [ProductId::new(1), ProductId::new(2)] {
            let before = wishlist.contains(id);
            let first = wishlist.toggle(id);
            let second = wishlist.toggle(id);
            assert_eq!(second, first.inverse());
            assert_eq!(wishlist.contains(id), before);
        }
    }

    #[test]
    fn test_no_duplicates() {
        let mut wishlist = Wishlist::new();
        wishlist.apply(ProductId::new(5), WishlistChange::Added);
        wishlist.apply(ProductId::new(5), WishlistChange::Added);
        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist.ids(), vec![ProductId::new(5)]);
    }

    #[test]
    fn test_apply_inverse_rolls_back() {
        let mut wishlist = Wishlist::new();
        let change = wishlist.toggle(ProductId::new(3));
        wishlist.apply(ProductId::new(3), change.inverse());
        assert!(wishlist.is_empty());
    }
}

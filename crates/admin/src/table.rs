//! Table state for admin lists: free-text search, status filter and paging.
//!
//! Any change to the search text, status filter or page size returns the
//! table to page 1.

use bazaar_core::catalog::Pager;
use bazaar_core::{Order, OrderStatus, Product};
use serde::{Deserialize, Serialize};

/// A row that can be searched and filtered by order status.
pub trait TableRow {
    /// Whether the row mentions `needle`, already lowercased and non-empty.
    fn matches_search(&self, needle: &str) -> bool;

    /// Status used by the status filter; rows without one never match a
    /// status filter.
    fn status(&self) -> Option<OrderStatus> {
        None
    }
}

impl TableRow for Product {
    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.category.slug().contains(needle)
            || self.sub_category.slug().contains(needle)
            || self.id.to_string() == needle
    }
}

impl TableRow for Order {
    fn matches_search(&self, needle: &str) -> bool {
        self.id.to_string() == needle
            || self.contact.full_name().to_lowercase().contains(needle)
            || self.contact.email.as_str().contains(needle)
    }

    fn status(&self) -> Option<OrderStatus> {
        Some(self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    search: String,
    status: Option<OrderStatus>,
    pager: Pager,
}

impl TableState {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            status: None,
            pager: Pager::new(page_size),
        }
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn status(&self) -> Option<OrderStatus> {
        self.status
    }

    #[must_use]
    pub const fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.pager.reset();
        }
    }

    pub fn set_status(&mut self, status: Option<OrderStatus>) {
        if status != self.status {
            self.status = status;
            self.pager.reset();
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    pub fn go_to<R: TableRow>(&mut self, page: usize, rows: &[R]) {
        let total = self.filter(rows).len();
        self.pager.go_to(page, total);
    }

    pub fn next<R: TableRow>(&mut self, rows: &[R]) {
        let total = self.filter(rows).len();
        self.pager.next(total);
    }

    pub fn prev<R: TableRow>(&mut self, rows: &[R]) {
        let total = self.filter(rows).len();
        self.pager.prev(total);
    }

    /// Rows passing the search and status filter, in input order.
    #[must_use]
    pub fn filter<'a, R: TableRow>(&self, rows: &'a [R]) -> Vec<&'a R> {
        let needle = self.search.trim().to_lowercase();
        rows.iter()
            .filter(|row| needle.is_empty() || row.matches_search(&needle))
            .filter(|row| self.status.is_none_or(|s| row.status() == Some(s)))
            .collect()
    }

    /// One page of filtered rows.
    #[must_use]
    pub fn view<'a, R: TableRow>(&self, rows: &'a [R]) -> TablePage<'a, R> {
        let filtered = self.filter(rows);
        let total = filtered.len();
        TablePage {
            rows: self.pager.slice(&filtered).to_vec(),
            page: self.pager.page().min(self.pager.total_pages(total)),
            total_pages: self.pager.total_pages(total),
            total,
        }
    }
}

/// The rows on the current page plus the numbers a pager control needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage<'a, R> {
    pub rows: Vec<&'a R>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

//! Catalog views: filtering, sorting, and paging of product sequences.

mod filter;
mod paging;

pub use filter::{
    CategoryConstraint, PriceRange, ProductQuery, SortKey, available_colors, best_sellers,
    new_arrivals, price_bounds, related,
};
pub use paging::{Pager, Reveal, page};

//! Core domain types for Bazaar.
//!
//! This module provides type-safe wrappers and aggregates for the catalog,
//! cart, wishlist, orders and accounts.

pub mod account;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod validation;
pub mod wishlist;

pub use account::{AccountRole, CustomerProfile, VendorProfile};
pub use cart::{AddOutcome, Cart, CartError, CartLine, CartSelection};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{ContactDetails, NewOrder, Order, OrderLine, ShippingAddress};
pub use price::{Price, PriceError};
pub use product::{Category, Gender, Product, ProductDraft, Size, SubCategory};
pub use status::{OrderStatus, PaymentMethod, StatusTransitionError};
pub use validation::{FieldError, ValidationErrors, Validator};
pub use wishlist::{Wishlist, WishlistChange};

//! Catalog product record and its classification enums.

use core::fmt;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, VendorId};
use super::price::Price;

/// Generates a closed, slug-addressable enumeration.
///
/// Each variant carries its wire/slug form and a display label. Slugs are
/// compared case-insensitively when parsing.
macro_rules! slug_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($slug:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $slug)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn slug(&self) -> &'static str {
                match self {
                    $(Self::$variant => $slug,)+
                }
            }

            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.slug().eq_ignore_ascii_case(needle) || v.label().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| format!(concat!("invalid ", stringify!($name), ": {}"), s))
            }
        }
    };
}

slug_enum! {
    /// Top-level product category.
    Category {
        Clothing => ("clothing", "Clothing"),
        Shoes => ("shoes", "Shoes"),
        Accessories => ("accessories", "Accessories"),
    }
}

slug_enum! {
    /// Finer-grained product type within a category.
    SubCategory {
        TShirts => ("t-shirts", "T-Shirts"),
        Shirts => ("shirts", "Shirts"),
        Jeans => ("jeans", "Jeans"),
        Dresses => ("dresses", "Dresses"),
        Jackets => ("jackets", "Jackets"),
        Sneakers => ("sneakers", "Sneakers"),
        Boots => ("boots", "Boots"),
        Bags => ("bags", "Bags"),
        Watches => ("watches", "Watches"),
        Hats => ("hats", "Hats"),
    }
}

slug_enum! {
    /// Storefront department the product is merchandised under.
    ///
    /// `Accessories` exists as a department so accessory items can be listed
    /// outside the gendered departments; the category filter never matches on it.
    Gender {
        Men => ("men", "Men"),
        Women => ("women", "Women"),
        Kids => ("kids", "Kids"),
        Unisex => ("unisex", "Unisex"),
        Accessories => ("accessories", "Accessories"),
    }
}

slug_enum! {
    /// Garment or shoe size offered by a product.
    Size {
        Xs => ("XS", "XS"),
        S => ("S", "S"),
        M => ("M", "M"),
        L => ("L", "L"),
        Xl => ("XL", "XL"),
        Xxl => ("XXL", "XXL"),
        OneSize => ("ONE SIZE", "One Size"),
    }
}

/// A product in the catalog.
///
/// The storefront never mutates products; admin and vendor edits replace the
/// whole record through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Pre-discount price shown struck through when present.
    #[serde(default)]
    pub original_price: Option<Price>,
    pub category: Category,
    pub sub_category: SubCategory,
    pub gender: Gender,
    /// Image URLs, first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: BTreeSet<Size>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub new_arrival: bool,
    #[serde(default)]
    pub best_seller: bool,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product is offered in `color` (case-insensitive).
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        let color = color.trim();
        self.colors.iter().any(|c| c.trim().eq_ignore_ascii_case(color))
    }

    #[must_use]
    pub fn has_size(&self, size: Size) -> bool {
        self.sizes.contains(&size)
    }

    /// Whole-number discount percentage against the original price, if any.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?.amount();
        let price = self.price.amount();
        if original <= price || original.is_zero() {
            return None;
        }
        ((original - price) / original * Decimal::ONE_HUNDRED)
            .round()
            .to_u32()
    }
}

/// Product fields as submitted by the admin console or vendor portal.
///
/// The backend assigns the id on create; updates replace the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub category: Category,
    pub sub_category: SubCategory,
    pub gender: Gender,
    pub images: Vec<String>,
    pub sizes: BTreeSet<Size>,
    pub colors: Vec<String>,
    pub stock: u32,
    pub new_arrival: bool,
    pub best_seller: bool,
    pub vendor_id: Option<VendorId>,
}

impl ProductDraft {
    /// The record the backend would hold after saving this draft as `id`.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            price: self.price,
            original_price: self.original_price,
            category: self.category,
            sub_category: self.sub_category,
            gender: self.gender,
            images: self.images,
            sizes: self.sizes,
            colors: self.colors,
            stock: self.stock,
            new_arrival: self.new_arrival,
            best_seller: self.best_seller,
            vendor_id: self.vendor_id,
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price,
            original_price: product.original_price,
            category: product.category,
            sub_category: product.sub_category,
            gender: product.gender,
            images: product.images.clone(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            stock: product.stock,
            new_arrival: product.new_arrival,
            best_seller: product.best_seller,
            vendor_id: product.vendor_id,
        }
    }
}

//! Product form validation and catalog management.

use std::collections::BTreeSet;

use bazaar_api::telemetry::add_breadcrumb;
use bazaar_api::{ApiError, ImageUpload};
use bazaar_core::{
    Category, Gender, Product, ProductDraft, ProductId, Size, SubCategory, ValidationErrors,
    Validator, VendorId,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AdminError, Result};
use crate::state::Admin;

const MIN_TITLE_LEN: usize = 3;

/// Raw product form input, shared by the admin console and vendor portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    /// Blank when the product is not discounted.
    pub original_price: String,
    pub category: String,
    pub sub_category: String,
    pub gender: String,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: String,
    pub new_arrival: bool,
    pub best_seller: bool,
}

impl ProductForm {
    /// Prefill for editing an existing product.
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_fixed(),
            original_price: product
                .original_price
                .map(|p| p.to_fixed())
                .unwrap_or_default(),
            category: product.category.slug().to_string(),
            sub_category: product.sub_category.slug().to_string(),
            gender: product.gender.slug().to_string(),
            images: product.images.clone(),
            sizes: product.sizes.iter().map(|s| s.slug().to_string()).collect(),
            colors: product.colors.clone(),
            stock: product.stock.to_string(),
            new_arrival: product.new_arrival,
            best_seller: product.best_seller,
        }
    }

    /// Check every field and build the draft sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(
        &self,
        vendor_id: Option<VendorId>,
    ) -> std::result::Result<ProductDraft, ValidationErrors> {
        let mut v = Validator::new();

        let title = v.min_len("title", &self.title, MIN_TITLE_LEN);
        let price = v.positive_price("price", &self.price);
        let original_price = v.optional_price("original_price", &self.original_price);
        if let (Some(price), Some(Some(original))) = (price, original_price)
            && original < price
        {
            v.reject("original_price", "must be at least the price");
        }

        let category = parse_choice::<Category>(&mut v, "category", &self.category);
        let sub_category = parse_choice::<SubCategory>(&mut v, "sub_category", &self.sub_category);
        let gender = parse_choice::<Gender>(&mut v, "gender", &self.gender);

        let images: Vec<String> = non_blank(&self.images);
        if images.is_empty() {
            v.reject("images", "add at least one image");
        }

        let mut sizes = BTreeSet::new();
        let mut unknown_size = false;
        for raw in non_blank(&self.sizes) {
            if let Ok(size) = raw.parse::<Size>() {
                sizes.insert(size);
            } else {
                unknown_size = true;
                v.reject("sizes", format!("unknown size {raw}"));
            }
        }
        if sizes.is_empty() && !unknown_size {
            v.reject("sizes", "choose at least one size");
        }

        let mut colors: Vec<String> = Vec::new();
        for color in non_blank(&self.colors) {
            if !colors.iter().any(|c| c.eq_ignore_ascii_case(&color)) {
                colors.push(color);
            }
        }
        if colors.is_empty() {
            v.reject("colors", "add at least one colour");
        }

        let stock = parse_stock(&mut v, &self.stock);

        let (
            Some(title),
            Some(price),
            Some(original_price),
            Some(category),
            Some(sub_category),
            Some(gender),
            Some(stock),
        ) = (
            title,
            price,
            original_price,
            category,
            sub_category,
            gender,
            stock,
        )
        else {
            return Err(v.finish().err().unwrap_or_default());
        };
        v.finish()?;

        Ok(ProductDraft {
            title,
            price,
            original_price,
            category,
            sub_category,
            gender,
            images,
            sizes,
            colors,
            stock,
            new_arrival: self.new_arrival,
            best_seller: self.best_seller,
            vendor_id,
        })
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_choice<T>(v: &mut Validator, field: &'static str, value: &str) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    if value.trim().is_empty() {
        v.reject(field, "is required");
        return None;
    }
    match value.parse() {
        Ok(choice) => Some(choice),
        Err(e) => {
            v.reject(field, e);
            None
        }
    }
}

fn parse_stock(v: &mut Validator, value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        v.reject("stock", "is required");
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => {
            v.reject("stock", "cannot be negative");
            None
        }
        Ok(n) => u32::try_from(n).map_or_else(
            |_| {
                v.reject("stock", "is too large");
                None
            },
            Some,
        ),
        Err(_) => {
            v.reject("stock", "must be a whole number");
            None
        }
    }
}

/// Check an image before uploading it.
///
/// # Errors
///
/// Returns a validation error for an empty file or a non-image content type.
pub fn validate_upload(upload: &ImageUpload) -> std::result::Result<(), ValidationErrors> {
    let mut v = Validator::new();
    if upload.file_name.trim().is_empty() {
        v.reject("image", "file name is required");
    }
    if !upload.content_type.starts_with("image/") {
        v.reject("image", "must be an image");
    }
    if upload.bytes.is_empty() {
        v.reject("image", "file is empty");
    }
    v.finish()
}

impl Admin {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>> {
        Ok(self.api().list_products().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no product has this id, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        match self.api().get_product(id).await {
            Ok(product) => Ok(product),
            Err(ApiError::NotFound(_)) => Err(AdminError::NotFound(format!("product {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns validation errors before any request, or an API error.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product> {
        let draft = form.validate(None)?;
        self.save_new(&draft).await
    }

    /// Replace a product. The owning vendor is kept.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any request, `NotFound` for an unknown
    /// product, or an API error.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, form: &ProductForm) -> Result<Product> {
        let existing = self.product(id).await?;
        let draft = form.validate(existing.vendor_id)?;
        self.save_existing(id, &draft).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown product, or an API error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        match self.api().delete_product(id).await {
            Ok(()) => {}
            Err(ApiError::NotFound(_)) => {
                return Err(AdminError::NotFound(format!("product {id}")));
            }
            Err(e) => return Err(e.into()),
        }
        info!(product_id = %id, "Product deleted");
        let product_id = id.to_string();
        add_breadcrumb("products", "Deleted product", Some(&[("product_id", product_id.as_str())]));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns validation errors for a bad file, or an API error.
    #[instrument(skip(self, upload), fields(product_id = %id))]
    pub async fn upload_product_image(&self, id: ProductId, upload: ImageUpload) -> Result<Product> {
        validate_upload(&upload)?;
        let product = self.api().upload_product_image(id, upload).await?;
        info!(product_id = %id, images = product.images.len(), "Product image uploaded");
        Ok(product)
    }

    pub(crate) async fn save_new(&self, draft: &ProductDraft) -> Result<Product> {
        let product = self.api().create_product(draft).await?;
        info!(product_id = %product.id, "Product created");
        let product_id = product.id.to_string();
        add_breadcrumb("products", "Created product", Some(&[("product_id", product_id.as_str())]));
        Ok(product)
    }

    pub(crate) async fn save_existing(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        let product = match self.api().update_product(id, draft).await {
            Ok(product) => product,
            Err(ApiError::NotFound(_)) => {
                return Err(AdminError::NotFound(format!("product {id}")));
            }
            Err(e) => return Err(e.into()),
        };
        info!(product_id = %id, "Product updated");
        let product_id = id.to_string();
        add_breadcrumb("products", "Updated product", Some(&[("product_id", product_id.as_str())]));
        Ok(product)
    }
}

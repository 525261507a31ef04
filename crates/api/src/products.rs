//! Product catalog endpoints.
//!
//! Reads go through the product cache; every write invalidates the list and
//! the affected product.

use bazaar_core::{Product, ProductDraft, ProductId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::ImageUpload;

impl ApiClient {
    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cache().get(&CacheKey::Products).await {
            debug!(count = products.len(), "Cache hit for products");
            return Ok(products);
        }

        let request = self.request(Method::GET, "/products").await?;
        let products: Vec<Product> = self.fetch(request).await?;

        self.cache()
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no product has this id, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self.request(Method::GET, &format!("/products/{id}")).await?;
        let product: Product = self.fetch(request).await?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let request = self.request(Method::POST, "/products").await?.json(draft);
        let product: Product = self.fetch(request).await?;
        self.invalidate_product(product.id).await;
        Ok(product)
    }

    /// Replace a product record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product no longer exists, or
    /// another error if the API request fails.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/products/{id}"))
            .await?
            .json(draft);
        let product = self.fetch(request).await;
        self.invalidate_product(id).await;
        product
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/products/{id}")).await?;
        let result = self.send(request).await;
        self.invalidate_product(id).await;
        result
    }

    /// Upload an image and attach it to a product.
    ///
    /// Sent as `multipart/form-data`; the transport sets the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is not a valid MIME type or the
    /// API request fails.
    #[instrument(skip(self, upload), fields(product_id = %id, file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_product_image(
        &self,
        id: ProductId,
        upload: ImageUpload,
    ) -> Result<Product, ApiError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("image", part);

        let request = self
            .request(Method::POST, &format!("/products/{id}/images"))
            .await?
            .multipart(form);
        let product = self.fetch(request).await;
        self.invalidate_product(id).await;
        product
    }

    async fn invalidate_product(&self, id: ProductId) {
        self.cache().invalidate(&CacheKey::Products).await;
        self.cache().invalidate(&CacheKey::Product(id)).await;
    }
}

//! Request and response bodies that only exist on the wire.

use bazaar_core::{
    CustomerProfile, Email, OrderStatus, Owner, ProductId, ShippingAddress, Size,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response to login and registration.
#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: CustomerProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartLineRequest<'a> {
    pub owner: String,
    pub product_id: ProductId,
    pub size: Size,
    pub color: &'a str,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistRequest {
    pub owner: String,
    pub product_id: ProductId,
}

/// A wishlist entry as listed by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistEntry {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusRequest {
    pub status: OrderStatus,
}

/// Editable customer profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<ShippingAddress>,
}

/// Editable vendor store fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfileUpdate {
    pub store_name: String,
    pub contact_email: Email,
    pub phone: Option<String>,
    pub description: Option<String>,
}

/// An image file to attach to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Query value for the `owner` parameter.
pub(crate) fn owner_param(owner: &Owner) -> [(&'static str, String); 1] {
    [("owner", owner.as_query_value())]
}

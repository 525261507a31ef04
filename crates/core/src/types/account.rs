//! Customer and vendor profiles.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{UserId, VendorId};
use super::order::ShippingAddress;

/// Role attached to an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    #[default]
    Customer,
    Vendor,
    Admin,
}

/// The signed-in customer's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<ShippingAddress>,
    #[serde(default)]
    pub role: AccountRole,
}

/// A marketplace vendor's public store profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub id: VendorId,
    pub store_name: String,
    pub contact_email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

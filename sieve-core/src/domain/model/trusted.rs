// sieve-core/src/domain/model/trusted.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// The three trusted tables a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustedTableKind {
    DimVendor,
    DimProduct,
    FactInventory,
}

impl TrustedTableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DimVendor => "dim_vendor",
            Self::DimProduct => "dim_product",
            Self::FactInventory => "fact_inventory",
        }
    }
}

impl fmt::Display for TrustedTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimVendor {
    pub vendor_code: String,
    pub vendor_name: String,
    pub country: String,
    /// Pattern-checked by the vendor gate.
    pub support_email: String,
}

/// Canonical vendor attributes, keyed by vendor_code in [`VendorLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorAttributes {
    pub vendor_name: String,
    pub country: String,
    pub support_email: String,
}

pub type VendorLookup = BTreeMap<String, VendorAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DimProduct {
    pub product_id: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub sku: String,
    pub model: String,
    pub category: String,
    #[validate(range(min = 1, message = "must be > 0"))]
    pub weight_g: i64,
    #[validate(range(min = 1, message = "must be > 0"))]
    pub length_mm: i64,
    #[validate(range(min = 1, message = "must be > 0"))]
    pub width_mm: i64,
    #[validate(range(min = 1, message = "must be > 0"))]
    pub height_mm: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub vendor_code: String,
    pub launch_date: Option<NaiveDateTime>,
    #[validate(range(min = 0.0, message = "must be >= 0"))]
    pub msrp_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FactInventory {
    pub product_id: i64,
    pub warehouse: String,
    #[validate(range(min = 0, message = "must be >= 0"))]
    pub on_hand: i64,
    #[validate(range(min = 0, message = "must be >= 0"))]
    pub min_stock: i64,
    pub last_counted_at: NaiveDateTime,
}

// sieve-core/src/domain/model/raw.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three raw tables a run consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawTableKind {
    Products,
    Vendors,
    Inventory,
}

impl RawTableKind {
    pub const ALL: [RawTableKind; 3] = [Self::Products, Self::Vendors, Self::Inventory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Vendors => "vendors",
            Self::Inventory => "inventory",
        }
    }

    /// Columns the raw shape declares. All must be present, even nullable ones.
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Products => &[
                "product_id",
                "sku",
                "model",
                "category",
                "weight_grams",
                "dimensions_mm",
                "vendor_code",
                "launch_date",
                "msrp_usd",
            ],
            Self::Vendors => &["vendor_code", "name", "country", "support_email"],
            Self::Inventory => &[
                "product_id",
                "warehouse",
                "on_hand",
                "min_stock",
                "last_counted_at",
            ],
        }
    }
}

impl fmt::Display for RawTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One raw row: column name to cell, `None` meaning null.
/// Empty strings are kept as-is, sources decide what counts as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord(BTreeMap<String, Option<String>>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Option<String>) {
        self.0.insert(column.into(), value);
    }

    /// Cell text, `None` when the column is absent or the cell is null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_deref())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A loosely typed table as delivered by a source, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub kind: RawTableKind,
    /// Column order as found in the source.
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(kind: RawTableKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A product row that passed the raw shape check. Loose columns stay as text
/// and are interpreted by the product transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProduct {
    pub product_id: Option<f64>,
    pub sku: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub weight_grams: Option<String>,
    pub dimensions_mm: Option<String>,
    pub vendor_code: Option<String>,
    pub launch_date: Option<String>,
    pub msrp_usd: Option<String>,
    /// Original cells, carried into quarantine untouched.
    pub record: RawRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVendor {
    pub vendor_code: String,
    pub name: String,
    pub country: String,
    pub support_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInventoryRecord {
    pub product_id: i64,
    pub warehouse: String,
    pub on_hand: i64,
    pub min_stock: i64,
    pub last_counted_at: NaiveDateTime,
    pub record: RawRecord,
}

/// The validated raw inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub products: Vec<RawProduct>,
    pub vendors: Vec<RawVendor>,
    pub inventory: Vec<RawInventoryRecord>,
    /// Source column order per table, reused for quarantine output.
    pub product_columns: Vec<String>,
    pub inventory_columns: Vec<String>,
}

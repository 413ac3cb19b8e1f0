// sieve-core/src/domain/model/quarantine.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::model::raw::{RawRecord, RawTableKind};

/// Why a raw row was diverted. Closed set: every quarantined row carries
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineReason {
    SkuMissing,
    DimensionsIncomplete,
    InvalidWeight,
    InvalidMsrp,
    VendorCodeMissing,
    NegativeOnHand,
    FkProductMissing,
}

impl QuarantineReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkuMissing => "sku_missing",
            Self::DimensionsIncomplete => "dimensions_incomplete",
            Self::InvalidWeight => "invalid_weight",
            Self::InvalidMsrp => "invalid_msrp",
            Self::VendorCodeMissing => "vendor_code_missing",
            Self::NegativeOnHand => "negative_on_hand",
            Self::FkProductMissing => "fk_product_missing",
        }
    }
}

impl fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuarantineReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku_missing" => Ok(Self::SkuMissing),
            "dimensions_incomplete" => Ok(Self::DimensionsIncomplete),
            "invalid_weight" => Ok(Self::InvalidWeight),
            "invalid_msrp" => Ok(Self::InvalidMsrp),
            "vendor_code_missing" => Ok(Self::VendorCodeMissing),
            "negative_on_hand" => Ok(Self::NegativeOnHand),
            "fk_product_missing" => Ok(Self::FkProductMissing),
            _ => Err(format!("Unknown quarantine reason: {}", s)),
        }
    }
}

/// A rejected raw row: original cells plus the rule that rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub record: RawRecord,
    pub reason: QuarantineReason,
}

/// All rows quarantined from one raw table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineTable {
    pub source: RawTableKind,
    /// Original column order; `reason` is appended on output.
    pub columns: Vec<String>,
    pub rows: Vec<QuarantineRecord>,
}

impl QuarantineTable {
    pub fn new(source: RawTableKind, columns: Vec<String>, rows: Vec<QuarantineRecord>) -> Self {
        Self {
            source,
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn counts_by_reason(&self) -> BTreeMap<QuarantineReason, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.reason).or_insert(0) += 1;
        }
        counts
    }
}

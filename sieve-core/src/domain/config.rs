// sieve-core/src/domain/config.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::domain::model::RawTableKind;

/// Run configuration. Every field has a default, so an absent `sieve.yaml`
/// behaves like an empty one.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct EtlConfig {
    #[serde(rename = "raw-dir", default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    #[serde(rename = "out-dir", default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Threads used for row-level transforms. 1 = sequential.
    #[serde(default = "default_workers")]
    #[validate(range(min = 1, max = 256, message = "workers must be between 1 and 256"))]
    pub workers: usize,

    #[serde(default)]
    #[validate(nested)]
    pub sources: SourceFiles,

    #[serde(default)]
    pub output: OutputLayout,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            out_dir: default_out_dir(),
            workers: default_workers(),
            sources: SourceFiles::default(),
            output: OutputLayout::default(),
        }
    }
}

/// File name of each raw table inside `raw-dir`. The extension picks the reader.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct SourceFiles {
    #[serde(default = "default_products_file")]
    #[validate(length(min = 1, message = "products file name cannot be empty"))]
    pub products: String,

    #[serde(default = "default_vendors_file")]
    #[validate(length(min = 1, message = "vendors file name cannot be empty"))]
    pub vendors: String,

    #[serde(default = "default_inventory_file")]
    #[validate(length(min = 1, message = "inventory file name cannot be empty"))]
    pub inventory: String,
}

impl SourceFiles {
    pub fn file_for(&self, kind: RawTableKind) -> &str {
        match kind {
            RawTableKind::Products => &self.products,
            RawTableKind::Vendors => &self.vendors,
            RawTableKind::Inventory => &self.inventory,
        }
    }
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            products: default_products_file(),
            vendors: default_vendors_file(),
            inventory: default_inventory_file(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputLayout {
    /// Hive-partition dim_product by vendor_code.
    #[serde(rename = "partition-products", default = "default_true")]
    pub partition_products: bool,

    /// Hive-partition fact_inventory by warehouse.
    #[serde(rename = "partition-inventory", default = "default_true")]
    pub partition_inventory: bool,

    /// Quarantine directory, relative to `out-dir`.
    #[serde(rename = "quarantine-dir", default = "default_quarantine_dir")]
    pub quarantine_dir: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            partition_products: true,
            partition_inventory: true,
            quarantine_dir: default_quarantine_dir(),
        }
    }
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("raw")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_workers() -> usize {
    1
}
fn default_products_file() -> String {
    "products.csv".to_string()
}
fn default_vendors_file() -> String {
    "vendors.jsonl".to_string()
}
fn default_inventory_file() -> String {
    "inventory.parquet".to_string()
}
fn default_quarantine_dir() -> PathBuf {
    PathBuf::from("silver/_quarantine")
}
fn default_true() -> bool {
    true
}

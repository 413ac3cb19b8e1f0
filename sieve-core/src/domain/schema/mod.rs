// sieve-core/src/domain/schema/mod.rs

pub mod raw;
pub mod trusted;
pub mod violation;

pub use raw::{
    validate_raw_dataset, validate_raw_inventory, validate_raw_products, validate_raw_vendors,
};
pub use trusted::{validate_dim_product, validate_dim_vendor, validate_fact_inventory};
pub use violation::{SchemaReport, Violation, ViolationKind};

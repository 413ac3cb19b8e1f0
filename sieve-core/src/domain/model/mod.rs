// sieve-core/src/domain/model/mod.rs

pub mod quarantine;
pub mod raw;
pub mod trusted;

pub use quarantine::{QuarantineReason, QuarantineRecord, QuarantineTable};
pub use raw::{
    RawDataset, RawInventoryRecord, RawProduct, RawRecord, RawTable, RawTableKind, RawVendor,
};
pub use trusted::{
    DimProduct, DimVendor, FactInventory, TrustedTableKind, VendorAttributes, VendorLookup,
};

// sieve-core/src/ports/sink.rs

use async_trait::async_trait;

use crate::domain::model::{DimProduct, DimVendor, FactInventory, QuarantineTable};
use crate::error::SieveError;

/// Destination of the trusted and quarantine tables.
///
/// The pipeline calls `reset` once, after every gate has passed, then each
/// writer once, then `commit`. A failing gate means no method is ever called.
/// A failing writer means `commit` is never called, and readers keep seeing
/// the previous run's outputs.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Starts a run. Leftovers of an earlier uncommitted run are discarded;
    /// the previous committed outputs stay in place.
    async fn reset(&self) -> Result<(), SieveError>;

    async fn write_dim_vendor(&self, rows: &[DimVendor]) -> Result<(), SieveError>;

    async fn write_dim_product(&self, rows: &[DimProduct]) -> Result<(), SieveError>;

    async fn write_fact_inventory(&self, rows: &[FactInventory]) -> Result<(), SieveError>;

    /// Only called for non-empty tables.
    async fn write_quarantine(&self, table: &QuarantineTable) -> Result<(), SieveError>;

    /// Replaces the previous outputs with everything written since `reset`.
    /// An output this run did not write (an empty quarantine) is removed.
    async fn commit(&self) -> Result<(), SieveError>;
}

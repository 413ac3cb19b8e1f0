// sieve-core/src/ports/source.rs

use async_trait::async_trait;

use crate::domain::model::{RawTable, RawTableKind};
use crate::error::SieveError;

/// Supplies the raw tables of a run, already normalized to text cells.
#[async_trait]
pub trait RawSource: Send + Sync {
    async fn load(&self, kind: RawTableKind) -> Result<RawTable, SieveError>;

    /// Human-readable origin of a table, used in logs and the run report.
    fn describe(&self, kind: RawTableKind) -> String;
}

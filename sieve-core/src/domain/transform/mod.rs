// sieve-core/src/domain/transform/mod.rs

//! Row-level policy engines turning validated raw rows into trusted rows or
//! quarantine entries.

pub mod inventory;
pub mod product;
pub mod vendor;

pub use inventory::{InventoryOutput, build_fact_inventory};
pub use product::{ProductOutput, build_dim_product};
pub use vendor::{VendorOutput, build_dim_vendor};

use crate::domain::model::{QuarantineReason, QuarantineRecord, RawRecord};

/// Terminal state of one raw row. There is no way back from either side.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Accepted(T),
    Quarantined {
        reason: QuarantineReason,
        record: RawRecord,
    },
}

impl<T> RowOutcome<T> {
    pub fn quarantine(reason: QuarantineReason, record: &RawRecord) -> Self {
        Self::Quarantined {
            reason,
            record: record.clone(),
        }
    }
}

/// Accepted and quarantined rows of one table, each in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub accepted: Vec<T>,
    pub quarantined: Vec<QuarantineRecord>,
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            quarantined: Vec::new(),
        }
    }
}

impl<T> Partition<T> {
    fn push(&mut self, outcome: RowOutcome<T>) {
        match outcome {
            RowOutcome::Accepted(row) => self.accepted.push(row),
            RowOutcome::Quarantined { reason, record } => {
                self.quarantined.push(QuarantineRecord { record, reason })
            }
        }
    }

    fn append(&mut self, mut other: Partition<T>) {
        self.accepted.append(&mut other.accepted);
        self.quarantined.append(&mut other.quarantined);
    }
}

/// Applies `decide` to every row and splits the outcomes.
///
/// With `shards > 1` the rows are cut into contiguous chunks decided on scoped
/// threads. Chunks are merged back in order, so the result is the same as the
/// sequential pass.
pub fn partition_rows<R, T, F>(rows: &[R], shards: usize, decide: F) -> Partition<T>
where
    R: Sync,
    T: Send,
    F: Fn(&R) -> RowOutcome<T> + Sync,
{
    if shards <= 1 || rows.len() < 2 {
        let mut partition = Partition::default();
        for row in rows {
            partition.push(decide(row));
        }
        return partition;
    }

    let chunk_size = rows.len().div_ceil(shards);
    let decide = &decide;

    std::thread::scope(|scope| {
        let handles: Vec<_> = rows
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut partition = Partition::default();
                    for row in chunk {
                        partition.push(decide(row));
                    }
                    partition
                })
            })
            .collect();

        let mut merged = Partition::default();
        for handle in handles {
            match handle.join() {
                Ok(shard) => merged.append(shard),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        merged
    })
}

// sieve-core/src/domain/transform/inventory.rs

use std::collections::HashSet;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::model::{
    DimProduct, FactInventory, QuarantineReason, QuarantineRecord, RawInventoryRecord,
};
use crate::domain::schema::validate_fact_inventory;
use crate::domain::transform::{RowOutcome, partition_rows};

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryOutput {
    pub fact_inventory: Vec<FactInventory>,
    pub quarantine: Vec<QuarantineRecord>,
}

/// Checks inventory rows against business rules and against the product ids
/// produced earlier in the same run. No state from previous runs is used.
pub fn build_fact_inventory(
    inventory: &[RawInventoryRecord],
    dim_product: &[DimProduct],
    shards: usize,
) -> Result<InventoryOutput, DomainError> {
    let product_ids: HashSet<i64> = dim_product.iter().map(|p| p.product_id).collect();
    let partition = partition_rows(inventory, shards, |row| decide_inventory(row, &product_ids));

    if !partition.accepted.is_empty() {
        validate_fact_inventory(&partition.accepted, &product_ids)?;
    }

    info!(
        accepted = partition.accepted.len(),
        quarantined = partition.quarantined.len(),
        "Inventory transformed"
    );

    Ok(InventoryOutput {
        fact_inventory: partition.accepted,
        quarantine: partition.quarantined,
    })
}

/// `negative_on_hand` is checked before the foreign key, so a negative row is
/// reported as such even when its product exists.
pub fn decide_inventory(
    row: &RawInventoryRecord,
    product_ids: &HashSet<i64>,
) -> RowOutcome<FactInventory> {
    if row.on_hand < 0 {
        return RowOutcome::quarantine(QuarantineReason::NegativeOnHand, &row.record);
    }
    if !product_ids.contains(&row.product_id) {
        return RowOutcome::quarantine(QuarantineReason::FkProductMissing, &row.record);
    }

    RowOutcome::Accepted(FactInventory {
        product_id: row.product_id,
        warehouse: row.warehouse.clone(),
        on_hand: row.on_hand,
        min_stock: row.min_stock,
        last_counted_at: row.last_counted_at,
    })
}

// sieve-core/src/domain/schema/raw.rs

//! Load-time shape check for raw tables.
//!
//! Each table is converted into typed raw rows while every problem is recorded
//! in a [`SchemaReport`]. Nothing is rejected row by row here: if the report is
//! non-empty the whole run stops, which is distinct from quarantine.

use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::model::{
    RawDataset, RawInventoryRecord, RawProduct, RawRecord, RawTable, RawTableKind, RawVendor,
};
use crate::domain::parsing::{parse_integer, parse_timestamp};
use crate::domain::schema::violation::{SchemaReport, ViolationKind};

/// Validates the three raw tables together so a single report lists the
/// violations of all of them.
#[instrument(skip_all)]
pub fn validate_raw_dataset(
    products: &RawTable,
    vendors: &RawTable,
    inventory: &RawTable,
) -> Result<RawDataset, DomainError> {
    let (products_out, mut report) = check_products(products);
    let (vendors_out, vendor_report) = check_vendors(vendors);
    let (inventory_out, inventory_report) = check_inventory(inventory);
    report.merge(vendor_report);
    report.merge(inventory_report);

    if !report.is_empty() {
        return Err(DomainError::RawSchema { report });
    }

    debug!(
        products = products_out.len(),
        vendors = vendors_out.len(),
        inventory = inventory_out.len(),
        "Raw tables passed shape validation"
    );

    Ok(RawDataset {
        products: products_out,
        vendors: vendors_out,
        inventory: inventory_out,
        product_columns: products.columns.clone(),
        inventory_columns: inventory.columns.clone(),
    })
}

pub fn validate_raw_products(table: &RawTable) -> Result<Vec<RawProduct>, DomainError> {
    let (rows, report) = check_products(table);
    report
        .into_result()
        .map_err(|report| DomainError::RawSchema { report })?;
    Ok(rows)
}

pub fn validate_raw_vendors(table: &RawTable) -> Result<Vec<RawVendor>, DomainError> {
    let (rows, report) = check_vendors(table);
    report
        .into_result()
        .map_err(|report| DomainError::RawSchema { report })?;
    Ok(rows)
}

pub fn validate_raw_inventory(table: &RawTable) -> Result<Vec<RawInventoryRecord>, DomainError> {
    let (rows, report) = check_inventory(table);
    report
        .into_result()
        .map_err(|report| DomainError::RawSchema { report })?;
    Ok(rows)
}

// --- PER-TABLE CHECKS ---

fn check_products(table: &RawTable) -> (Vec<RawProduct>, SchemaReport) {
    let mut report = start_report(table, RawTableKind::Products);
    let mut rows = Vec::with_capacity(table.len());

    for (idx, record) in table.rows.iter().enumerate() {
        let sku = required(record, idx, "sku", &mut report).map(str::to_string);
        let product_id = optional_number(record, idx, "product_id", &mut report);
        let text = |column: &str| record.get(column).map(str::to_string);

        rows.push(RawProduct {
            product_id,
            sku,
            model: text("model"),
            category: text("category"),
            weight_grams: text("weight_grams"),
            dimensions_mm: text("dimensions_mm"),
            vendor_code: text("vendor_code"),
            launch_date: text("launch_date"),
            msrp_usd: text("msrp_usd"),
            record: record.clone(),
        });
    }

    (rows, report)
}

fn check_vendors(table: &RawTable) -> (Vec<RawVendor>, SchemaReport) {
    let mut report = start_report(table, RawTableKind::Vendors);
    let mut rows = Vec::with_capacity(table.len());

    for (idx, record) in table.rows.iter().enumerate() {
        let vendor_code = required(record, idx, "vendor_code", &mut report);
        let name = required(record, idx, "name", &mut report);
        let country = required(record, idx, "country", &mut report);
        let support_email = required(record, idx, "support_email", &mut report);

        if let (Some(vendor_code), Some(name), Some(country), Some(support_email)) =
            (vendor_code, name, country, support_email)
        {
            rows.push(RawVendor {
                vendor_code: vendor_code.to_string(),
                name: name.to_string(),
                country: country.to_string(),
                support_email: support_email.to_string(),
            });
        }
    }

    (rows, report)
}

fn check_inventory(table: &RawTable) -> (Vec<RawInventoryRecord>, SchemaReport) {
    let mut report = start_report(table, RawTableKind::Inventory);
    let mut rows = Vec::with_capacity(table.len());

    for (idx, record) in table.rows.iter().enumerate() {
        let product_id = required_integer(record, idx, "product_id", &mut report);
        let warehouse = required(record, idx, "warehouse", &mut report);
        let on_hand = required_integer(record, idx, "on_hand", &mut report);
        let min_stock = required_integer(record, idx, "min_stock", &mut report);
        let last_counted_at = required(record, idx, "last_counted_at", &mut report).and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                report.push(
                    Some(idx),
                    "last_counted_at",
                    ViolationKind::NotATimestamp {
                        value: raw.to_string(),
                    },
                );
            }
            parsed
        });

        if let Some(value) = min_stock
            && value < 0
        {
            report.push(
                Some(idx),
                "min_stock",
                ViolationKind::Constraint {
                    value: value.to_string(),
                    rule: "must be >= 0".to_string(),
                },
            );
        }

        if let (Some(product_id), Some(warehouse), Some(on_hand), Some(min_stock), Some(last_counted_at)) =
            (product_id, warehouse, on_hand, min_stock, last_counted_at)
        {
            rows.push(RawInventoryRecord {
                product_id,
                warehouse: warehouse.to_string(),
                on_hand,
                min_stock,
                last_counted_at,
                record: record.clone(),
            });
        }
    }

    (rows, report)
}

// --- CELL HELPERS ---

/// Opens a report and records every expected column the table lacks.
fn start_report(table: &RawTable, kind: RawTableKind) -> SchemaReport {
    let mut report = SchemaReport::new(kind.as_str());
    for column in kind.expected_columns() {
        if !table.has_column(column) {
            report.push(None, column, ViolationKind::MissingColumn);
        }
    }
    report
}

/// Non-null cell. A missing column was already reported once at table level,
/// so it is not repeated for every row.
fn required<'a>(
    record: &'a RawRecord,
    idx: usize,
    column: &str,
    report: &mut SchemaReport,
) -> Option<&'a str> {
    let value = record.get(column);
    if value.is_none() && record.contains_column(column) {
        report.push(Some(idx), column, ViolationKind::Null);
    }
    value
}

fn required_integer(
    record: &RawRecord,
    idx: usize,
    column: &str,
    report: &mut SchemaReport,
) -> Option<i64> {
    let raw = required(record, idx, column, report)?;
    let parsed = parse_integer(raw);
    if parsed.is_none() {
        report.push(
            Some(idx),
            column,
            ViolationKind::NotAnInteger {
                value: raw.to_string(),
            },
        );
    }
    parsed
}

/// Nullable float column. Empty text and `NaN` count as null; other
/// non-numeric or non-finite values are violations, as are ids too large
/// to become a 64-bit integer.
fn optional_number(
    record: &RawRecord,
    idx: usize,
    column: &str,
    report: &mut SchemaReport,
) -> Option<f64> {
    let raw = record.get(column).map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_nan() => None,
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => Some(value),
        _ => {
            report.push(
                Some(idx),
                column,
                ViolationKind::NotANumber {
                    value: raw.to_string(),
                },
            );
            None
        }
    }
}

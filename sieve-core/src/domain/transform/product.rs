// sieve-core/src/domain/transform/product.rs

use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::model::{
    DimProduct, QuarantineReason, QuarantineRecord, RawProduct, VendorLookup,
};
use crate::domain::parsing::{
    derive_product_id, parse_date_lenient, parse_dimensions, parse_float_lenient,
};
use crate::domain::schema::validate_dim_product;
use crate::domain::transform::{RowOutcome, partition_rows};

/// Placeholder for blank `model` / `category`.
pub const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductOutput {
    pub dim_product: Vec<DimProduct>,
    pub quarantine: Vec<QuarantineRecord>,
}

/// Decides every product row, then runs the trusted gate on the accepted ones.
///
/// `vendors` is not consulted by any rule yet; it is threaded through so
/// enrichment can be added without changing callers.
pub fn build_dim_product(
    products: &[RawProduct],
    vendors: &VendorLookup,
    shards: usize,
) -> Result<ProductOutput, DomainError> {
    let partition = partition_rows(products, shards, |row| decide_product(row, vendors));

    if !partition.accepted.is_empty() {
        validate_dim_product(&partition.accepted)?;
    }

    info!(
        accepted = partition.accepted.len(),
        quarantined = partition.quarantined.len(),
        "Products transformed"
    );

    Ok(ProductOutput {
        dim_product: partition.accepted,
        quarantine: partition.quarantined,
    })
}

/// Applies the product rules in order; the first failing rule is the reason.
pub fn decide_product(row: &RawProduct, _vendors: &VendorLookup) -> RowOutcome<DimProduct> {
    let sku = trimmed(row.sku.as_deref());
    if sku.is_empty() {
        return RowOutcome::quarantine(QuarantineReason::SkuMissing, &row.record);
    }

    let product_id = match row.product_id {
        Some(id) => id.trunc() as i64,
        None => {
            let derived = derive_product_id(sku);
            debug!(sku, product_id = derived, "Derived product id from sku");
            derived
        }
    };

    let Some((length_mm, width_mm, height_mm)) = parse_dimensions(row.dimensions_mm.as_deref())
    else {
        return RowOutcome::quarantine(QuarantineReason::DimensionsIncomplete, &row.record);
    };

    let weight = match parse_float_lenient(row.weight_grams.as_deref()) {
        Some(w) if w > 0.0 => w,
        _ => return RowOutcome::quarantine(QuarantineReason::InvalidWeight, &row.record),
    };

    let msrp = match parse_float_lenient(row.msrp_usd.as_deref()) {
        Some(m) if m >= 0.0 => m,
        _ => return RowOutcome::quarantine(QuarantineReason::InvalidMsrp, &row.record),
    };

    let vendor_code = trimmed(row.vendor_code.as_deref());
    if vendor_code.is_empty() {
        return RowOutcome::quarantine(QuarantineReason::VendorCodeMissing, &row.record);
    }

    RowOutcome::Accepted(DimProduct {
        product_id,
        sku: sku.to_string(),
        model: or_unknown(row.model.as_deref()),
        category: or_unknown(row.category.as_deref()),
        weight_g: weight.trunc() as i64,
        length_mm,
        width_mm,
        height_mm,
        vendor_code: vendor_code.to_string(),
        launch_date: parse_date_lenient(row.launch_date.as_deref()),
        msrp_usd: msrp,
    })
}

fn trimmed(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or_default()
}

fn or_unknown(value: Option<&str>) -> String {
    match trimmed(value) {
        "" => UNKNOWN.to_string(),
        text => text.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::RawRecord;
    use chrono::Datelike;

    fn raw(sku: Option<&str>) -> RawProduct {
        let mut record = RawRecord::new();
        record.insert("sku", sku.map(str::to_string));
        RawProduct {
            product_id: Some(1001.0),
            sku: sku.map(str::to_string),
            model: Some("RX-1".into()),
            category: Some("Router".into()),
            weight_grams: Some("900".into()),
            dimensions_mm: Some("200x150x40".into()),
            vendor_code: Some("V-77".into()),
            launch_date: Some("2023-05-01".into()),
            msrp_usd: Some("129.99".into()),
            record,
        }
    }

    fn reason_of(row: &RawProduct) -> Option<QuarantineReason> {
        match decide_product(row, &VendorLookup::new()) {
            RowOutcome::Accepted(_) => None,
            RowOutcome::Quarantined { reason, .. } => Some(reason),
        }
    }

    fn accepted(row: &RawProduct) -> DimProduct {
        match decide_product(row, &VendorLookup::new()) {
            RowOutcome::Accepted(product) => product,
            RowOutcome::Quarantined { reason, .. } => panic!("unexpected quarantine: {reason}"),
        }
    }

    #[test]
    fn test_happy_path() {
        let product = accepted(&raw(Some(" AB-001 ")));
        assert_eq!(product.product_id, 1001);
        assert_eq!(product.sku, "AB-001");
        assert_eq!((product.length_mm, product.width_mm, product.height_mm), (200, 150, 40));
        assert_eq!(product.weight_g, 900);
        assert_eq!(product.msrp_usd, 129.99);
        assert_eq!(product.launch_date.unwrap().year(), 2023);
    }

    #[test]
    fn test_rules_in_order() {
        assert_eq!(reason_of(&raw(None)), Some(QuarantineReason::SkuMissing));
        assert_eq!(reason_of(&raw(Some("   "))), Some(QuarantineReason::SkuMissing));

        let mut row = raw(Some("ZZ-001"));
        row.dimensions_mm = Some("90x60x".into());
        // Every later rule also fails; the first one wins.
        row.weight_grams = None;
        row.msrp_usd = Some("-1".into());
        row.vendor_code = None;
        assert_eq!(reason_of(&row), Some(QuarantineReason::DimensionsIncomplete));

        row.dimensions_mm = Some("90x60x30".into());
        assert_eq!(reason_of(&row), Some(QuarantineReason::InvalidWeight));

        row.weight_grams = Some("12,5".into());
        assert_eq!(reason_of(&row), Some(QuarantineReason::InvalidMsrp));
        row.msrp_usd = Some("cheap".into());
        assert_eq!(reason_of(&row), Some(QuarantineReason::InvalidMsrp));

        row.msrp_usd = Some("0".into());
        assert_eq!(reason_of(&row), Some(QuarantineReason::VendorCodeMissing));
        row.vendor_code = Some("   ".into());
        assert_eq!(reason_of(&row), Some(QuarantineReason::VendorCodeMissing));

        row.vendor_code = Some("V-1".into());
        assert_eq!(reason_of(&row), None);
    }

    #[test]
    fn test_weight_rules() {
        for bad in ["0", "-5", "heavy", ""] {
            let mut row = raw(Some("AB-001"));
            row.weight_grams = Some(bad.into());
            assert_eq!(reason_of(&row), Some(QuarantineReason::InvalidWeight), "{bad}");
        }
        let mut row = raw(Some("AB-001"));
        row.weight_grams = Some("650,9".into());
        assert_eq!(accepted(&row).weight_g, 650);
    }

    #[test]
    fn test_missing_product_id_is_derived_from_sku() {
        let mut row = raw(Some("AB-001"));
        row.product_id = None;
        let first = accepted(&row);
        let second = accepted(&row);
        assert_eq!(first.product_id, derive_product_id("AB-001"));
        assert_eq!(first.product_id, second.product_id);
    }

    #[test]
    fn test_blank_model_and_category_default() {
        let mut row = raw(Some("AB-001"));
        row.model = Some("  ".into());
        row.category = None;
        let product = accepted(&row);
        assert_eq!(product.model, UNKNOWN);
        assert_eq!(product.category, UNKNOWN);
    }

    #[test]
    fn test_unparsable_launch_date_is_null_not_rejected() {
        let mut row = raw(Some("AB-001"));
        row.launch_date = Some("2021-02-29".into());
        assert_eq!(accepted(&row).launch_date, None);
    }

    #[test]
    fn test_incomplete_dimensions_quarantined_with_original_fields() {
        let mut row = raw(Some("ZZ-001"));
        row.dimensions_mm = Some("90x60x".into());
        row.record.insert("dimensions_mm", Some("90x60x".into()));

        let out = build_dim_product(&[row], &VendorLookup::new(), 1).unwrap();
        assert!(out.dim_product.is_empty());
        assert_eq!(out.quarantine.len(), 1);
        assert_eq!(out.quarantine[0].reason, QuarantineReason::DimensionsIncomplete);
        assert_eq!(out.quarantine[0].record.get("sku"), Some("ZZ-001"));
        assert_eq!(out.quarantine[0].record.get("dimensions_mm"), Some("90x60x"));
    }

    #[test]
    fn test_gate_catches_zero_dimension() {
        let mut row = raw(Some("AB-001"));
        row.dimensions_mm = Some("0x10x10".into());
        assert!(matches!(
            build_dim_product(&[row], &VendorLookup::new(), 1),
            Err(DomainError::TrustedSchema { .. })
        ));
    }

    #[test]
    fn test_gate_catches_duplicate_ids() {
        let rows = vec![raw(Some("AB-001")), raw(Some("AB-002"))];
        assert!(matches!(
            build_dim_product(&rows, &VendorLookup::new(), 1),
            Err(DomainError::TrustedSchema { .. })
        ));
    }
}

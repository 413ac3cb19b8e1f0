// sieve-core/src/domain/schema/trusted.rs

//! Final gate in front of the trusted tables.
//!
//! The transform rules should make these checks unreachable. A failure here
//! means a rule let through a row it should have quarantined, so it aborts the
//! run instead of diverting the row.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::model::{DimProduct, DimVendor, FactInventory, TrustedTableKind};
use crate::domain::schema::violation::{SchemaReport, ViolationKind};

pub const SUPPORT_EMAIL_PATTERN: &str = r".+@.+\..+";

fn re_support_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(SUPPORT_EMAIL_PATTERN)
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

pub fn validate_dim_vendor(rows: &[DimVendor]) -> Result<(), DomainError> {
    let mut report = SchemaReport::new(TrustedTableKind::DimVendor.as_str());
    let mut seen = HashSet::with_capacity(rows.len());

    for (idx, vendor) in rows.iter().enumerate() {
        if !seen.insert(vendor.vendor_code.as_str()) {
            report.push(
                Some(idx),
                "vendor_code",
                ViolationKind::DuplicateKey {
                    value: vendor.vendor_code.clone(),
                },
            );
        }
        if !re_support_email().is_match(&vendor.support_email) {
            report.push(
                Some(idx),
                "support_email",
                ViolationKind::Constraint {
                    value: vendor.support_email.clone(),
                    rule: format!("must match {}", SUPPORT_EMAIL_PATTERN),
                },
            );
        }
    }

    report
        .into_result()
        .map_err(|report| DomainError::TrustedSchema { report })
}

pub fn validate_dim_product(rows: &[DimProduct]) -> Result<(), DomainError> {
    let mut report = SchemaReport::new(TrustedTableKind::DimProduct.as_str());
    let mut seen = HashSet::with_capacity(rows.len());

    for (idx, product) in rows.iter().enumerate() {
        if !seen.insert(product.product_id) {
            report.push(
                Some(idx),
                "product_id",
                ViolationKind::DuplicateKey {
                    value: product.product_id.to_string(),
                },
            );
        }
        if let Err(errors) = product.validate() {
            report.extend_from_validation(idx, &errors);
        }
    }

    report
        .into_result()
        .map_err(|report| DomainError::TrustedSchema { report })
}

/// Also re-checks the product foreign key against the ids of this run.
pub fn validate_fact_inventory(
    rows: &[FactInventory],
    product_ids: &HashSet<i64>,
) -> Result<(), DomainError> {
    let mut report = SchemaReport::new(TrustedTableKind::FactInventory.as_str());

    for (idx, fact) in rows.iter().enumerate() {
        if !product_ids.contains(&fact.product_id) {
            report.push(
                Some(idx),
                "product_id",
                ViolationKind::DanglingReference {
                    value: fact.product_id.to_string(),
                    target: TrustedTableKind::DimProduct.to_string(),
                },
            );
        }
        if let Err(errors) = fact.validate() {
            report.extend_from_validation(idx, &errors);
        }
    }

    report
        .into_result()
        .map_err(|report| DomainError::TrustedSchema { report })
}

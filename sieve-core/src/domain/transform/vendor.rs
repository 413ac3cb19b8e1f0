// sieve-core/src/domain/transform/vendor.rs

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::model::{DimVendor, RawVendor, VendorAttributes, VendorLookup};
use crate::domain::schema::validate_dim_vendor;

#[derive(Debug, Clone, PartialEq)]
pub struct VendorOutput {
    /// One row per vendor_code, ordered by vendor_code.
    pub dim_vendor: Vec<DimVendor>,
    pub lookup: VendorLookup,
}

/// Collapses duplicate vendor rows into one canonical row per vendor_code.
///
/// - `vendor_name`: longest `name` of the group (character count); the first
///   one seen wins a tie.
/// - `country`, `support_email`: taken from the first row of the group.
pub fn build_dim_vendor(vendors: &[RawVendor]) -> Result<VendorOutput, DomainError> {
    let mut groups: BTreeMap<&str, Vec<&RawVendor>> = BTreeMap::new();
    for vendor in vendors {
        groups
            .entry(vendor.vendor_code.as_str())
            .or_default()
            .push(vendor);
    }

    let dim_vendor: Vec<DimVendor> = groups
        .into_iter()
        .filter_map(|(code, group)| consolidate(code, &group))
        .collect();

    validate_dim_vendor(&dim_vendor)?;

    let lookup: VendorLookup = dim_vendor
        .iter()
        .map(|v| {
            (
                v.vendor_code.clone(),
                VendorAttributes {
                    vendor_name: v.vendor_name.clone(),
                    country: v.country.clone(),
                    support_email: v.support_email.clone(),
                },
            )
        })
        .collect();

    debug!(
        raw = vendors.len(),
        distinct = dim_vendor.len(),
        "Vendors consolidated"
    );

    Ok(VendorOutput { dim_vendor, lookup })
}

fn consolidate(code: &str, group: &[&RawVendor]) -> Option<DimVendor> {
    let first = group.first()?;
    let mut longest = first.name.as_str();
    let mut longest_len = longest.chars().count();
    for vendor in &group[1..] {
        let len = vendor.name.chars().count();
        if len > longest_len {
            longest = vendor.name.as_str();
            longest_len = len;
        }
    }

    Some(DimVendor {
        vendor_code: code.to_string(),
        vendor_name: longest.to_string(),
        country: first.country.clone(),
        support_email: first.support_email.clone(),
    })
}

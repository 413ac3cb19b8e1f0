// sieve-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::schema::SchemaReport;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Raw schema validation failed ({} violations):\n{report}", .report.len())]
    #[diagnostic(
        code(sieve::domain::raw_schema),
        help("The source data does not have the expected shape. Fix the listed columns/rows upstream and re-run.")
    )]
    RawSchema { report: SchemaReport },

    #[error("Trusted schema gate failed for '{}' ({} violations):\n{report}", .report.table(), .report.len())]
    #[diagnostic(
        code(sieve::domain::trusted_schema),
        help("A row accepted by the transform rules broke a trusted-table invariant. This is a transform defect, not bad input.")
    )]
    TrustedSchema { report: SchemaReport },
}

// sieve-core/src/application/mod.rs

pub mod pipeline;
pub mod report;

// Facade: the CLI only needs `use sieve_core::application::{run_etl, RunMode, RunReport}`.
pub use pipeline::{EtlOutcome, RunMode, run_etl, transform_dataset};
pub use report::{REPORT_FILE, RunReport, TableSummary};

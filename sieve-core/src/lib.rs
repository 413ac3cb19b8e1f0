// sieve-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL LAYOUT ---

// Contracts for reading raw tables and writing trusted ones.
pub mod ports;

// Parsing, schema gates and transforms. Depends on nothing else in the crate.
pub mod domain;

// Adapters: config files, CSV/JSONL/Parquet readers, Parquet writer.
pub mod infrastructure;

// Use cases: the ETL run and its report.
pub mod application;

pub mod error;

pub use error::SieveError;

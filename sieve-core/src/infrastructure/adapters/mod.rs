// sieve-core/src/infrastructure/adapters/mod.rs

pub mod datafusion;
pub mod file_source;

pub use self::datafusion::{ParquetSink, read_parquet_table};
pub use file_source::{FileSource, RawFormat};

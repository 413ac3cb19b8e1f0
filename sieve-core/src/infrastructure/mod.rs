// sieve-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;

pub use adapters::{FileSource, ParquetSink};
pub use config::{ConfigOverrides, load_config};

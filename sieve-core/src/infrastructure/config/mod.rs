// sieve-core/src/infrastructure/config/mod.rs

pub mod loader;

pub use crate::domain::config::EtlConfig;
pub use loader::{ConfigOverrides, load_config};

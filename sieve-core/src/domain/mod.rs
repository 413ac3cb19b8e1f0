pub mod config;
pub mod error;
pub mod model;
pub mod parsing;
pub mod schema;
pub mod transform;

// Short import path for the rest of the crate
pub use error::DomainError;

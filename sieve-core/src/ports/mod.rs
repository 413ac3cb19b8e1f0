// sieve-core/src/ports/mod.rs

// Contracts the application needs from the outside world. Adapters live in
// `infrastructure`; tests plug in-memory implementations.

pub mod sink;
pub mod source;

pub use sink::TableSink;
pub use source::RawSource;

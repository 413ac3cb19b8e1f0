// sieve-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(
        code(sieve::infra::engine::datafusion),
        help("An error occurred while reading or writing Parquet.")
    )]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Arrow Error: {0}")]
    #[diagnostic(
        code(sieve::infra::engine::arrow),
        help("A column could not be built or cast. Check the column types of the Parquet input.")
    )]
    Arrow(#[from] datafusion::arrow::error::ArrowError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- PARQUET ENGINE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(sieve::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(sieve::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(sieve::infra::config))]
    ConfigError(String),

    // --- RAW INPUTS ---
    #[error("CSV Error in '{path}': {source}")]
    #[diagnostic(
        code(sieve::infra::csv),
        help("Every CSV row must have as many fields as the header.")
    )]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON Error in '{path}' line {line}: {source}")]
    #[diagnostic(
        code(sieve::infra::jsonl),
        help("Each non-empty line of a .jsonl file must be one JSON object.")
    )]
    Json {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Raw table '{table}' not found. Checked: {candidates}")]
    #[diagnostic(
        code(sieve::infra::source_missing),
        help("Put the file in the raw directory or set its name under `sources:` in sieve.yaml.")
    )]
    SourceNotFound { table: String, candidates: String },

    #[error("Unsupported raw file format '{0}'")]
    #[diagnostic(
        code(sieve::infra::format),
        help("Supported extensions are .csv, .jsonl and .parquet.")
    )]
    UnsupportedFormat(String),

    #[error("Serialization Error: {0}")]
    #[diagnostic(code(sieve::infra::serialize))]
    Serialize(String),
}

// Shortcuts so `?` works directly on engine calls
impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Engine(EngineError::DataFusion(err))
    }
}

impl From<datafusion::arrow::error::ArrowError> for InfrastructureError {
    fn from(err: datafusion::arrow::error::ArrowError) -> Self {
        InfrastructureError::Engine(EngineError::Arrow(err))
    }
}

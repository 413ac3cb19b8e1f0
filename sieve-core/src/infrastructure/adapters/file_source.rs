// sieve-core/src/infrastructure/adapters/file_source.rs

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::domain::config::SourceFiles;
use crate::domain::model::{RawRecord, RawTable, RawTableKind};
use crate::error::SieveError;
use crate::infrastructure::adapters::datafusion::read_parquet_table;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::source::RawSource;

/// On-disk formats a raw table can come in. Chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    Csv,
    JsonLines,
    Parquet,
}

impl RawFormat {
    /// Fallback lookup order when the configured file is missing.
    pub const FALLBACK_ORDER: [RawFormat; 3] = [Self::Csv, Self::JsonLines, Self::Parquet];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
            Self::Parquet => "parquet",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, InfrastructureError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "parquet" => Ok(Self::Parquet),
            _ => Err(InfrastructureError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Reads raw tables from a directory of files.
pub struct FileSource {
    raw_dir: PathBuf,
    files: SourceFiles,
}

impl FileSource {
    pub fn new(raw_dir: &Path, files: SourceFiles) -> Self {
        Self {
            raw_dir: raw_dir.to_path_buf(),
            files,
        }
    }

    /// The configured file if it exists, else `<table>.csv|.jsonl|.parquet`.
    pub fn resolve_path(&self, kind: RawTableKind) -> Result<PathBuf, InfrastructureError> {
        let configured = self.raw_dir.join(self.files.file_for(kind));
        if configured.is_file() {
            return Ok(configured);
        }

        let mut candidates = vec![configured.clone()];
        for format in RawFormat::FALLBACK_ORDER {
            let candidate = self
                .raw_dir
                .join(format!("{}.{}", kind.as_str(), format.extension()));
            if candidate.is_file() {
                warn!(
                    table = %kind,
                    configured = ?configured,
                    using = ?candidate,
                    "Configured raw file missing, using fallback"
                );
                return Ok(candidate);
            }
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        Err(InfrastructureError::SourceNotFound {
            table: kind.as_str().to_string(),
            candidates: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

#[async_trait]
impl RawSource for FileSource {
    #[instrument(skip(self), fields(table = %kind))]
    async fn load(&self, kind: RawTableKind) -> Result<RawTable, SieveError> {
        let path = self.resolve_path(kind)?;
        let table = match RawFormat::from_path(&path)? {
            RawFormat::Csv => read_csv_table(&path, kind).await?,
            RawFormat::JsonLines => read_jsonl_table(&path, kind).await?,
            RawFormat::Parquet => read_parquet_table(&path, kind).await?,
        };
        info!(path = ?path, rows = table.len(), columns = table.columns.len(), "Raw table loaded");
        Ok(table)
    }

    fn describe(&self, kind: RawTableKind) -> String {
        match self.resolve_path(kind) {
            Ok(path) => path.display().to_string(),
            Err(_) => self
                .raw_dir
                .join(self.files.file_for(kind))
                .display()
                .to_string(),
        }
    }
}

/// Cell values read as null, on top of the empty cell. Matched exactly, so
/// `na` or ` NA ` stay text.
pub const CSV_NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_csv_null(cell: &str) -> bool {
    cell.is_empty() || CSV_NULL_TOKENS.contains(&cell)
}

/// Every cell is kept as text; an empty field or a `CSV_NULL_TOKENS` entry is null.
pub async fn read_csv_table(path: &Path, kind: RawTableKind) -> Result<RawTable, InfrastructureError> {
    let bytes = tokio::fs::read(path).await?;
    let csv_err = |source: csv::Error| InfrastructureError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = RawTable::new(kind, columns);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row: RawRecord = table
            .columns
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| {
                let value = (!is_csv_null(cell)).then(|| cell.to_string());
                (column.clone(), value)
            })
            .collect();
        table.rows.push(row);
    }

    debug!(path = ?path, rows = table.len(), "CSV parsed");
    Ok(table)
}

/// One JSON object per line. Columns are the union of keys in first-seen
/// order; a key missing from a line is null for that row.
pub async fn read_jsonl_table(
    path: &Path,
    kind: RawTableKind,
) -> Result<RawTable, InfrastructureError> {
    let content = tokio::fs::read_to_string(path).await?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<RawRecord> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(line).map_err(|source| InfrastructureError::Json {
                path: path.display().to_string(),
                line: idx + 1,
                source,
            })?;

        let mut row = RawRecord::new();
        for (key, value) in object {
            if !columns.contains(&key) {
                columns.push(key.clone());
            }
            row.insert(key, json_cell(value));
        }
        rows.push(row);
    }

    for row in &mut rows {
        for column in &columns {
            if !row.contains_column(column) {
                row.insert(column.clone(), None);
            }
        }
    }

    let mut table = RawTable::new(kind, columns);
    table.rows = rows;
    Ok(table)
}

fn json_cell(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        nested => Some(nested.to_string()),
    }
}

// sieve-core/src/application/report.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::model::{QuarantineReason, QuarantineTable, RawTableKind, TrustedTableKind};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const REPORT_FILE: &str = "run_results.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: TrustedTableKind,
    pub accepted: usize,
    pub quarantined: usize,
}

/// Outcome of one run, written to `run_results.json` and printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    pub dry_run: bool,
    pub workers: usize,
    /// Where each raw table was read from.
    pub sources: BTreeMap<RawTableKind, String>,
    pub raw_rows: BTreeMap<RawTableKind, usize>,
    pub tables: Vec<TableSummary>,
    pub quarantine_reasons: BTreeMap<QuarantineReason, usize>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn new(dry_run: bool, workers: usize) -> Self {
        Self {
            success: false,
            dry_run,
            workers,
            sources: BTreeMap::new(),
            raw_rows: BTreeMap::new(),
            tables: Vec::new(),
            quarantine_reasons: BTreeMap::new(),
            elapsed_ms: 0,
        }
    }

    pub fn record_table(&mut self, table: TrustedTableKind, accepted: usize, quarantined: usize) {
        self.tables.push(TableSummary {
            table,
            accepted,
            quarantined,
        });
    }

    pub fn record_quarantine(&mut self, table: &QuarantineTable) {
        for (reason, count) in table.counts_by_reason() {
            *self.quarantine_reasons.entry(reason).or_insert(0) += count;
        }
    }

    pub fn accepted(&self, table: TrustedTableKind) -> usize {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map_or(0, |t| t.accepted)
    }

    pub fn total_quarantined(&self) -> usize {
        self.quarantine_reasons.values().sum()
    }

    /// Serializes the report next to the trusted tables.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf, InfrastructureError> {
        let path = out_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| InfrastructureError::Serialize(e.to_string()))?;
        atomic_write(&path, json)?;
        Ok(path)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.success, self.dry_run) {
            (true, true) => "checked",
            (true, false) => "written",
            (false, _) => "failed",
        };
        writeln!(f, "run {} (workers: {})", status, self.workers)?;
        for (kind, rows) in &self.raw_rows {
            writeln!(f, "  raw {}: {} rows", kind, rows)?;
        }
        for t in &self.tables {
            writeln!(
                f,
                "  {}: {} accepted, {} quarantined",
                t.table, t.accepted, t.quarantined
            )?;
        }
        if !self.quarantine_reasons.is_empty() {
            writeln!(f, "  quarantine reasons:")?;
            for (reason, count) in &self.quarantine_reasons {
                writeln!(f, "    {}: {}", reason, count)?;
            }
        }
        Ok(())
    }
}

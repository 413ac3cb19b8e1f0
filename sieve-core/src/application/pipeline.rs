// sieve-core/src/application/pipeline.rs

use std::time::Instant;
use tracing::{info, instrument};

use crate::application::report::RunReport;
use crate::domain::config::EtlConfig;
use crate::domain::error::DomainError;
use crate::domain::model::{
    DimProduct, DimVendor, FactInventory, QuarantineTable, RawDataset, RawTableKind,
    TrustedTableKind, VendorLookup,
};
use crate::domain::schema::validate_raw_dataset;
use crate::domain::transform::{build_dim_product, build_dim_vendor, build_fact_inventory};
use crate::error::SieveError;
use crate::ports::{RawSource, TableSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Validate, transform and write every output.
    Write,
    /// Validate and transform only. Nothing touches the output directory.
    DryRun,
}

/// Everything a run produces, before anything is written.
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub dim_vendor: Vec<DimVendor>,
    pub vendor_lookup: VendorLookup,
    pub dim_product: Vec<DimProduct>,
    pub fact_inventory: Vec<FactInventory>,
    pub product_quarantine: QuarantineTable,
    pub inventory_quarantine: QuarantineTable,
}

/// Vendors, then products, then inventory. Each stage only sees outputs of
/// this run; any gate failure aborts the whole transform.
#[instrument(skip(dataset), fields(products = dataset.products.len(), inventory = dataset.inventory.len()))]
pub fn transform_dataset(dataset: &RawDataset, workers: usize) -> Result<EtlOutcome, DomainError> {
    let vendors = build_dim_vendor(&dataset.vendors)?;
    let products = build_dim_product(&dataset.products, &vendors.lookup, workers)?;
    let inventory = build_fact_inventory(&dataset.inventory, &products.dim_product, workers)?;

    Ok(EtlOutcome {
        dim_vendor: vendors.dim_vendor,
        vendor_lookup: vendors.lookup,
        dim_product: products.dim_product,
        fact_inventory: inventory.fact_inventory,
        product_quarantine: QuarantineTable::new(
            RawTableKind::Products,
            dataset.product_columns.clone(),
            products.quarantine,
        ),
        inventory_quarantine: QuarantineTable::new(
            RawTableKind::Inventory,
            dataset.inventory_columns.clone(),
            inventory.quarantine,
        ),
    })
}

/// Runs the ETL end to end.
///
/// The three raw tables are loaded concurrently. Outputs are only touched
/// once raw validation, every transform and every trusted gate have passed.
/// They are replaced in one `commit` after the last table is written, so a
/// failing run leaves the previous outputs in place.
#[instrument(skip(source, sink, config), fields(workers = config.workers))]
pub async fn run_etl<S, K>(
    source: &S,
    sink: &K,
    config: &EtlConfig,
    mode: RunMode,
) -> Result<RunReport, SieveError>
where
    S: RawSource + ?Sized,
    K: TableSink + ?Sized,
{
    let start_time = Instant::now();
    let mut report = RunReport::new(mode == RunMode::DryRun, config.workers);

    // 1. LOAD
    let (products, vendors, inventory) = futures::try_join!(
        source.load(RawTableKind::Products),
        source.load(RawTableKind::Vendors),
        source.load(RawTableKind::Inventory),
    )?;
    for table in [&products, &vendors, &inventory] {
        report.sources.insert(table.kind, source.describe(table.kind));
        report.raw_rows.insert(table.kind, table.len());
    }

    // 2. RAW SCHEMA (hard failure, nothing written)
    let dataset = validate_raw_dataset(&products, &vendors, &inventory)?;
    info!("Raw schema validated");

    // 3. TRANSFORM + TRUSTED GATES
    let outcome = transform_dataset(&dataset, config.workers)?;

    report.record_table(TrustedTableKind::DimVendor, outcome.dim_vendor.len(), 0);
    report.record_table(
        TrustedTableKind::DimProduct,
        outcome.dim_product.len(),
        outcome.product_quarantine.len(),
    );
    report.record_table(
        TrustedTableKind::FactInventory,
        outcome.fact_inventory.len(),
        outcome.inventory_quarantine.len(),
    );
    report.record_quarantine(&outcome.product_quarantine);
    report.record_quarantine(&outcome.inventory_quarantine);

    // 4. WRITE
    if mode == RunMode::Write {
        write_outcome(sink, &outcome).await?;
    }

    report.success = true;
    report.elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

    if mode == RunMode::Write {
        let path = report.write_to(&config.out_dir)?;
        info!(path = ?path, "Run report written");
    }

    info!(
        elapsed_ms = report.elapsed_ms,
        quarantined = report.total_quarantined(),
        "Run finished"
    );
    Ok(report)
}

async fn write_outcome<K>(sink: &K, outcome: &EtlOutcome) -> Result<(), SieveError>
where
    K: TableSink + ?Sized,
{
    sink.reset().await?;
    sink.write_dim_vendor(&outcome.dim_vendor).await?;
    sink.write_dim_product(&outcome.dim_product).await?;
    sink.write_fact_inventory(&outcome.fact_inventory).await?;

    for quarantine in [&outcome.product_quarantine, &outcome.inventory_quarantine] {
        if !quarantine.is_empty() {
            sink.write_quarantine(quarantine).await?;
        }
    }
    sink.commit().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::{QuarantineReason, RawRecord, RawTable};
    use crate::infrastructure::error::InfrastructureError;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemorySource {
        tables: HashMap<RawTableKind, RawTable>,
    }

    #[async_trait]
    impl RawSource for MemorySource {
        async fn load(&self, kind: RawTableKind) -> Result<RawTable, SieveError> {
            self.tables
                .get(&kind)
                .cloned()
                .ok_or_else(|| SieveError::InternalError(format!("no table {kind}")))
        }

        fn describe(&self, kind: RawTableKind) -> String {
            format!("memory://{kind}")
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        /// Writers whose call starts with this prefix fail after logging.
        fail_on: Option<&'static str>,
    }

    impl RecordingSink {
        fn failing_on(prefix: &'static str) -> Self {
            Self {
                fail_on: Some(prefix),
                ..Self::default()
            }
        }

        fn log(&self, call: String) -> Result<(), SieveError> {
            let failed = self.fail_on.is_some_and(|p| call.starts_with(p));
            self.calls.lock().unwrap().push(call.clone());
            if failed {
                return Err(std::io::Error::other(format!("disk full during {call}")).into());
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TableSink for RecordingSink {
        async fn reset(&self) -> Result<(), SieveError> {
            self.log("reset".into())
        }
        async fn write_dim_vendor(&self, rows: &[DimVendor]) -> Result<(), SieveError> {
            self.log(format!("dim_vendor:{}", rows.len()))
        }
        async fn write_dim_product(&self, rows: &[DimProduct]) -> Result<(), SieveError> {
            self.log(format!("dim_product:{}", rows.len()))
        }
        async fn write_fact_inventory(&self, rows: &[FactInventory]) -> Result<(), SieveError> {
            self.log(format!("fact_inventory:{}", rows.len()))
        }
        async fn write_quarantine(&self, table: &QuarantineTable) -> Result<(), SieveError> {
            self.log(format!("quarantine/{}:{}", table.source, table.len()))
        }
        async fn commit(&self) -> Result<(), SieveError> {
            self.log("commit".into())
        }
    }

    fn table(kind: RawTableKind, rows: &[&[Option<&str>]]) -> RawTable {
        let columns: Vec<String> = kind
            .expected_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut table = RawTable::new(kind, columns.clone());
        for cells in rows {
            let record: RawRecord = columns
                .iter()
                .zip(cells.iter())
                .map(|(c, v)| (c.clone(), v.map(str::to_string)))
                .collect();
            table.rows.push(record);
        }
        table
    }

    fn fixture() -> MemorySource {
        let products = table(
            RawTableKind::Products,
            &[
                &[Some("1001"), Some("AB-001"), Some("RX-1"), Some("Router"), Some("900"), Some("200x150x40"), Some("V-77"), Some("2023-05-01"), Some("129.99")],
                &[None, Some("ZZ-001"), None, None, Some("100"), Some("90x60x"), Some("V-77"), None, Some("5")],
                &[None, Some("CD-002"), Some("Hub"), Some("Switch"), Some("12,5"), Some("10x10x10"), Some("V-1"), Some("2024/13/02"), Some("0")],
            ],
        );
        let vendors = table(
            RawTableKind::Vendors,
            &[
                &[Some("V-77"), Some("Vectortron"), Some("DE"), Some("support@vectortron.com")],
                &[Some("V-77"), Some("Vectortron GmbH"), Some("DE"), Some("care@vectortron.com")],
                &[Some("V-1"), Some("One"), Some("US"), Some("o@one.com")],
            ],
        );
        let inventory = table(
            RawTableKind::Inventory,
            &[
                &[Some("1001"), Some("WH-A"), Some("5"), Some("1"), Some("2024-01-15 10:00:00")],
                &[Some("9999"), Some("WH-A"), Some("1"), Some("0"), Some("2024-01-15 10:00:00")],
                &[Some("1001"), Some("WH-B"), Some("-2"), Some("0"), Some("2024-01-15 10:00:00")],
            ],
        );
        MemorySource {
            tables: [
                (RawTableKind::Products, products),
                (RawTableKind::Vendors, vendors),
                (RawTableKind::Inventory, inventory),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[tokio::test]
    async fn test_run_writes_everything_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = EtlConfig {
            out_dir: dir.path().to_path_buf(),
            ..EtlConfig::default()
        };
        let sink = RecordingSink::default();

        let report = run_etl(&fixture(), &sink, &config, RunMode::Write).await?;

        assert!(report.success);
        assert_eq!(
            sink.calls(),
            vec![
                "reset",
                "dim_vendor:2",
                "dim_product:2",
                "fact_inventory:1",
                "quarantine/products:1",
                "quarantine/inventory:2",
                "commit",
            ]
        );
        assert_eq!(report.quarantine_reasons[&QuarantineReason::DimensionsIncomplete], 1);
        assert_eq!(report.quarantine_reasons[&QuarantineReason::FkProductMissing], 1);
        assert_eq!(report.quarantine_reasons[&QuarantineReason::NegativeOnHand], 1);
        assert_eq!(report.sources[&RawTableKind::Vendors], "memory://vendors");
        assert!(dir.path().join("run_results.json").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_write_never_commits() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = EtlConfig {
            out_dir: dir.path().to_path_buf(),
            ..EtlConfig::default()
        };
        let sink = RecordingSink::failing_on("fact_inventory");

        let result = run_etl(&fixture(), &sink, &config, RunMode::Write).await;

        assert!(matches!(
            result,
            Err(SieveError::Infrastructure(InfrastructureError::Io(_)))
        ));
        assert_eq!(
            sink.calls(),
            vec!["reset", "dim_vendor:2", "dim_product:2", "fact_inventory:1"]
        );
        assert!(!dir.path().join("run_results.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = EtlConfig {
            out_dir: dir.path().join("out"),
            ..EtlConfig::default()
        };
        let sink = RecordingSink::default();

        let report = run_etl(&fixture(), &sink, &config, RunMode::DryRun).await?;

        assert!(report.dry_run);
        assert_eq!(report.accepted(TrustedTableKind::DimProduct), 2);
        assert!(sink.calls().is_empty());
        assert!(!config.out_dir.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_raw_schema_failure_writes_nothing() -> Result<()> {
        let mut source = fixture();
        let vendors = source.tables.get_mut(&RawTableKind::Vendors).unwrap();
        vendors.rows[0].insert("support_email", None);
        let sink = RecordingSink::default();

        let result = run_etl(&source, &sink, &EtlConfig::default(), RunMode::Write).await;

        assert!(matches!(
            result,
            Err(SieveError::Domain(DomainError::RawSchema { .. }))
        ));
        assert!(sink.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_trusted_gate_failure_writes_nothing() -> Result<()> {
        let mut source = fixture();
        let vendors = source.tables.get_mut(&RawTableKind::Vendors).unwrap();
        vendors.rows[2].insert("support_email", Some("not-an-email".into()));
        let sink = RecordingSink::default();

        let result = run_etl(&source, &sink, &EtlConfig::default(), RunMode::Write).await;

        assert!(matches!(
            result,
            Err(SieveError::Domain(DomainError::TrustedSchema { .. }))
        ));
        assert!(sink.calls().is_empty());
        Ok(())
    }

    #[test]
    fn test_sharded_transform_matches_sequential() -> Result<()> {
        let source = fixture();
        let dataset = validate_raw_dataset(
            &source.tables[&RawTableKind::Products],
            &source.tables[&RawTableKind::Vendors],
            &source.tables[&RawTableKind::Inventory],
        )?;

        let sequential = transform_dataset(&dataset, 1)?;
        let sharded = transform_dataset(&dataset, 3)?;

        assert_eq!(sequential.dim_product, sharded.dim_product);
        assert_eq!(sequential.fact_inventory, sharded.fact_inventory);
        assert_eq!(sequential.product_quarantine, sharded.product_quarantine);
        assert_eq!(sequential.inventory_quarantine, sharded.inventory_quarantine);
        Ok(())
    }

    #[test]
    fn test_fact_ids_are_subset_of_product_ids() -> Result<()> {
        let source = fixture();
        let dataset = validate_raw_dataset(
            &source.tables[&RawTableKind::Products],
            &source.tables[&RawTableKind::Vendors],
            &source.tables[&RawTableKind::Inventory],
        )?;
        let outcome = transform_dataset(&dataset, 1)?;

        let ids: std::collections::HashSet<i64> =
            outcome.dim_product.iter().map(|p| p.product_id).collect();
        assert!(outcome.fact_inventory.iter().all(|f| ids.contains(&f.product_id)));
        assert_eq!(outcome.vendor_lookup["V-77"].vendor_name, "Vectortron GmbH");
        Ok(())
    }
}

// sieve-core/src/infrastructure/adapters/datafusion.rs

use async_trait::async_trait;
use datafusion::arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::config::OutputLayout;
use crate::domain::model::{
    DimProduct, DimVendor, FactInventory, QuarantineTable, RawRecord, RawTable, RawTableKind,
    TrustedTableKind,
};
use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{promote_output, remove_output};
use crate::ports::sink::TableSink;

/// Column added to every quarantine table.
pub const REASON_COLUMN: &str = "reason";

/// Reads a Parquet file and casts every column to text, so it can go through
/// the same raw validation as CSV and JSONL inputs.
#[instrument(skip(path), fields(path = ?path))]
pub async fn read_parquet_table(
    path: &Path,
    kind: RawTableKind,
) -> Result<RawTable, InfrastructureError> {
    let ctx = SessionContext::new();
    let df = ctx
        .read_parquet(path_str(path)?, ParquetReadOptions::default())
        .await?;
    let columns: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let batches = df.collect().await?;

    let mut table = RawTable::new(kind, columns);
    for batch in batches {
        let mut text_columns = Vec::with_capacity(batch.num_columns());
        for column in batch.columns() {
            let casted = cast(column, &DataType::Utf8)?;
            let strings = casted
                .as_any()
                .downcast_ref::<StringArray>()
                .cloned()
                .ok_or_else(|| {
                    InfrastructureError::Serialize("Utf8 cast did not yield a StringArray".into())
                })?;
            text_columns.push(strings);
        }

        for row in 0..batch.num_rows() {
            let record: RawRecord = table
                .columns
                .iter()
                .zip(&text_columns)
                .map(|(name, values)| {
                    let cell = (!values.is_null(row)).then(|| values.value(row).to_string());
                    (name.clone(), cell)
                })
                .collect();
            table.rows.push(record);
        }
    }

    debug!(rows = table.len(), "Parquet read");
    Ok(table)
}

/// Writes trusted tables and quarantine logs as Parquet under `out_dir`.
///
/// Layout:
/// - `dim_vendor/data.parquet`
/// - `dim_product/vendor_code=<v>/...` (or `dim_product/data.parquet` unpartitioned)
/// - `fact_inventory/warehouse=<w>/...` (same rule)
/// - `<quarantine_dir>/<products|inventory>.parquet`
///
/// Writers fill the same layout under `<out_dir>/.staging`; `commit` renames
/// it into place, so an interrupted run never replaces the last good outputs.
pub struct ParquetSink {
    out_dir: PathBuf,
    staging_dir: PathBuf,
    layout: OutputLayout,
}

/// Staging area of an uncommitted run, relative to `out_dir`.
pub const STAGING_DIR: &str = ".staging";

const TRUSTED_TABLES: [TrustedTableKind; 3] = [
    TrustedTableKind::DimVendor,
    TrustedTableKind::DimProduct,
    TrustedTableKind::FactInventory,
];

const QUARANTINE_SOURCES: [RawTableKind; 2] = [RawTableKind::Products, RawTableKind::Inventory];

impl ParquetSink {
    pub fn new(out_dir: &Path, layout: OutputLayout) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            staging_dir: out_dir.join(STAGING_DIR),
            layout,
        }
    }

    /// Committed location of a trusted table.
    pub fn table_dir(&self, kind: TrustedTableKind) -> PathBuf {
        self.out_dir.join(kind.as_str())
    }

    /// Committed location of a quarantine log.
    pub fn quarantine_path(&self, source: RawTableKind) -> PathBuf {
        self.out_dir.join(self.quarantine_file(source))
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn staged_table_dir(&self, kind: TrustedTableKind) -> PathBuf {
        self.staging_dir.join(kind.as_str())
    }

    fn staged_quarantine_path(&self, source: RawTableKind) -> PathBuf {
        self.staging_dir.join(self.quarantine_file(source))
    }

    fn quarantine_file(&self, source: RawTableKind) -> PathBuf {
        self.layout
            .quarantine_dir
            .join(format!("{}.parquet", source.as_str()))
    }

    async fn write_batch(
        &self,
        batch: RecordBatch,
        target_dir: &Path,
        partition_by: Option<&str>,
    ) -> Result<(), InfrastructureError> {
        std::fs::create_dir_all(target_dir)?;
        let rows = batch.num_rows();

        let ctx = SessionContext::new();
        let df = ctx.read_batch(batch)?;
        match partition_by {
            Some(column) => {
                // Trailing separator: DataFusion treats the target as a directory.
                let target = format!("{}/", path_str(target_dir)?.trim_end_matches('/'));
                df.write_parquet(
                    &target,
                    DataFrameWriteOptions::new().with_partition_by(vec![column.to_string()]),
                    None,
                )
                .await?;
            }
            None => {
                let file = target_dir.join("data.parquet");
                write_single_file(df, &file).await?;
            }
        }

        info!(path = ?target_dir, rows, partition_by = ?partition_by, "Table staged");
        Ok(())
    }
}

async fn write_single_file(df: DataFrame, file: &Path) -> Result<(), InfrastructureError> {
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    df.write_parquet(
        path_str(file)?,
        DataFrameWriteOptions::new().with_single_file_output(true),
        None,
    )
    .await?;
    Ok(())
}

fn path_str(path: &Path) -> Result<&str, InfrastructureError> {
    path.to_str().ok_or_else(|| {
        InfrastructureError::ConfigError(format!("Path is not valid UTF-8: {:?}", path))
    })
}

#[async_trait]
impl TableSink for ParquetSink {
    async fn reset(&self) -> Result<(), SieveError> {
        remove_output(&self.staging_dir)?;
        std::fs::create_dir_all(&self.staging_dir)?;
        debug!(path = ?self.staging_dir, "Staging area ready");
        Ok(())
    }

    async fn write_dim_vendor(&self, rows: &[DimVendor]) -> Result<(), SieveError> {
        let batch = dim_vendor_batch(rows)?;
        let target = self.staged_table_dir(TrustedTableKind::DimVendor);
        self.write_batch(batch, &target, None).await?;
        Ok(())
    }

    async fn write_dim_product(&self, rows: &[DimProduct]) -> Result<(), SieveError> {
        let batch = dim_product_batch(rows)?;
        let partition = self.layout.partition_products.then_some("vendor_code");
        let target = self.staged_table_dir(TrustedTableKind::DimProduct);
        self.write_batch(batch, &target, partition).await?;
        Ok(())
    }

    async fn write_fact_inventory(&self, rows: &[FactInventory]) -> Result<(), SieveError> {
        let batch = fact_inventory_batch(rows)?;
        let partition = self.layout.partition_inventory.then_some("warehouse");
        let target = self.staged_table_dir(TrustedTableKind::FactInventory);
        self.write_batch(batch, &target, partition).await?;
        Ok(())
    }

    async fn write_quarantine(&self, table: &QuarantineTable) -> Result<(), SieveError> {
        let batch = quarantine_batch(table)?;
        let path = self.staged_quarantine_path(table.source);
        let rows = batch.num_rows();

        let ctx = SessionContext::new();
        let df = ctx.read_batch(batch).map_err(InfrastructureError::from)?;
        write_single_file(df, &path).await?;

        info!(path = ?path, rows, "Quarantine staged");
        Ok(())
    }

    #[instrument(skip(self), fields(out_dir = ?self.out_dir))]
    async fn commit(&self) -> Result<(), SieveError> {
        for kind in TRUSTED_TABLES {
            promote_output(&self.staged_table_dir(kind), &self.table_dir(kind))?;
        }
        for source in QUARANTINE_SOURCES {
            promote_output(
                &self.staged_quarantine_path(source),
                &self.quarantine_path(source),
            )?;
        }
        remove_output(&self.staging_dir)?;
        info!("Outputs committed");
        Ok(())
    }
}

// --- Arrow conversions ---

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

fn ints(values: impl Iterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(values))
}

pub fn dim_vendor_batch(rows: &[DimVendor]) -> Result<RecordBatch, InfrastructureError> {
    let schema = Schema::new(vec![
        Field::new("vendor_code", DataType::Utf8, false),
        Field::new("vendor_name", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("support_email", DataType::Utf8, false),
    ]);
    let columns = vec![
        strings(rows.iter().map(|r| r.vendor_code.as_str())),
        strings(rows.iter().map(|r| r.vendor_name.as_str())),
        strings(rows.iter().map(|r| r.country.as_str())),
        strings(rows.iter().map(|r| r.support_email.as_str())),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

pub fn dim_product_batch(rows: &[DimProduct]) -> Result<RecordBatch, InfrastructureError> {
    let schema = Schema::new(vec![
        Field::new("product_id", DataType::Int64, false),
        Field::new("sku", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("weight_g", DataType::Int64, false),
        Field::new("length_mm", DataType::Int64, false),
        Field::new("width_mm", DataType::Int64, false),
        Field::new("height_mm", DataType::Int64, false),
        Field::new("vendor_code", DataType::Utf8, false),
        Field::new(
            "launch_date",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            true,
        ),
        Field::new("msrp_usd", DataType::Float64, false),
    ]);
    let launch_dates: TimestampMicrosecondArray = rows
        .iter()
        .map(|r| r.launch_date.map(|d| d.and_utc().timestamp_micros()))
        .collect();
    let columns = vec![
        ints(rows.iter().map(|r| r.product_id)),
        strings(rows.iter().map(|r| r.sku.as_str())),
        strings(rows.iter().map(|r| r.model.as_str())),
        strings(rows.iter().map(|r| r.category.as_str())),
        ints(rows.iter().map(|r| r.weight_g)),
        ints(rows.iter().map(|r| r.length_mm)),
        ints(rows.iter().map(|r| r.width_mm)),
        ints(rows.iter().map(|r| r.height_mm)),
        strings(rows.iter().map(|r| r.vendor_code.as_str())),
        Arc::new(launch_dates) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.msrp_usd))) as ArrayRef,
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

pub fn fact_inventory_batch(rows: &[FactInventory]) -> Result<RecordBatch, InfrastructureError> {
    let schema = Schema::new(vec![
        Field::new("product_id", DataType::Int64, false),
        Field::new("warehouse", DataType::Utf8, false),
        Field::new("on_hand", DataType::Int64, false),
        Field::new("min_stock", DataType::Int64, false),
        Field::new(
            "last_counted_at",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
    ]);
    let counted_at = TimestampMicrosecondArray::from_iter_values(
        rows.iter()
            .map(|r| r.last_counted_at.and_utc().timestamp_micros()),
    );
    let columns = vec![
        ints(rows.iter().map(|r| r.product_id)),
        strings(rows.iter().map(|r| r.warehouse.as_str())),
        ints(rows.iter().map(|r| r.on_hand)),
        ints(rows.iter().map(|r| r.min_stock)),
        Arc::new(counted_at) as ArrayRef,
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Original columns as nullable text, in source order, then `reason`.
pub fn quarantine_batch(table: &QuarantineTable) -> Result<RecordBatch, InfrastructureError> {
    let source_columns: Vec<&String> = table
        .columns
        .iter()
        .filter(|c| c.as_str() != REASON_COLUMN)
        .collect();

    let mut fields: Vec<Field> = source_columns
        .iter()
        .map(|c| Field::new(c.as_str(), DataType::Utf8, true))
        .collect();
    fields.push(Field::new(REASON_COLUMN, DataType::Utf8, false));

    let mut columns: Vec<ArrayRef> = source_columns
        .iter()
        .map(|c| {
            let values: StringArray = table.rows.iter().map(|r| r.record.get(c)).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();
    columns.push(strings(table.rows.iter().map(|r| r.reason.as_str())));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

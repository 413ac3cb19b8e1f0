use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use datafusion::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A throwaway copy of the sample project (raw/ tables, no outputs).
struct SieveTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl SieveTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_project");

        let dest = tmp.path().join("sample_project");
        Self::copy_dir(&fixture, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn sieve(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sieve"));
        cmd.current_dir(&self.root);
        cmd.env_remove("SIEVE_RAW_DIR")
            .env_remove("SIEVE_OUT_DIR")
            .env_remove("SIEVE_WORKERS");
        cmd
    }

    fn out(&self) -> PathBuf {
        self.root.join("data")
    }

    fn run_results(&self) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(self.out().join("run_results.json"))
            .context("run_results.json not written")?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn parquet_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("parquet"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn dir_arg(path: &Path) -> Result<String> {
    Ok(format!("{}/", path.to_str().context("non UTF-8 path")?))
}

#[tokio::test]
async fn test_run_writes_trusted_tables_and_quarantine() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));

    let out = env.out();
    assert!(out.join("dim_vendor/data.parquet").is_file());
    assert!(out.join("dim_product/vendor_code=V-77").is_dir());
    assert!(out.join("dim_product/vendor_code=V-1").is_dir());
    assert!(out.join("fact_inventory/warehouse=WH-A").is_dir());
    assert!(out.join("fact_inventory/warehouse=WH-C").is_dir());
    assert!(!out.join("fact_inventory/warehouse=WH-B").exists());
    assert!(out.join("silver/_quarantine/products.parquet").is_file());
    assert!(out.join("silver/_quarantine/inventory.parquet").is_file());
    assert!(!out.join(".staging").exists());

    let ctx = SessionContext::new();

    // Vendor dedup: one row per code, longest name kept.
    let vendors = ctx
        .read_parquet(
            out.join("dim_vendor/data.parquet")
                .to_str()
                .context("non UTF-8 path")?,
            ParquetReadOptions::default(),
        )
        .await?;
    assert_eq!(vendors.clone().count().await?, 2);
    let vectortron = vendors
        .filter(
            col("vendor_code")
                .eq(lit("V-77"))
                .and(col("vendor_name").eq(lit("Vectortron GmbH"))),
        )?
        .count()
        .await?;
    assert_eq!(vectortron, 1);

    // The derived id of CD-002 is what the inventory fixture references.
    let products = ctx
        .read_parquet(dir_arg(&out.join("dim_product"))?, ParquetReadOptions::default())
        .await?;
    let derived = products
        .filter(col("product_id").eq(lit(219_162_759_726_193_i64)))?
        .count()
        .await?;
    assert_eq!(derived, 1);

    let quarantine = ctx
        .read_parquet(
            out.join("silver/_quarantine/products.parquet")
                .to_str()
                .context("non UTF-8 path")?,
            ParquetReadOptions::default(),
        )
        .await?;
    let incomplete = quarantine
        .filter(
            col("sku")
                .eq(lit("ZZ-001"))
                .and(col("dimensions_mm").eq(lit("90x60x")))
                .and(col("reason").eq(lit("dimensions_incomplete"))),
        )?
        .count()
        .await?;
    assert_eq!(incomplete, 1);

    let report = env.run_results()?;
    assert_eq!(report["success"], true);
    assert_eq!(report["raw_rows"]["products"], 5);
    assert_eq!(report["tables"][1]["accepted"], 2);
    assert_eq!(report["tables"][1]["quarantined"], 3);
    assert_eq!(report["tables"][2]["accepted"], 2);
    assert_eq!(report["quarantine_reasons"]["sku_missing"], 1);
    assert_eq!(report["quarantine_reasons"]["invalid_weight"], 1);
    assert_eq!(report["quarantine_reasons"]["negative_on_hand"], 1);
    assert_eq!(report["quarantine_reasons"]["fk_product_missing"], 1);
    Ok(())
}

#[test]
fn test_rerun_overwrites_previous_outputs() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve().arg("run").assert().success();
    let first = parquet_files(&env.out()).len();

    env.sieve().args(["run", "--workers", "3"]).assert().success();
    let second = parquet_files(&env.out()).len();

    assert!(first > 0);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_check_writes_nothing() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing was written"))
        .stdout(predicate::str::contains("dimensions_incomplete"));

    assert!(!env.out().exists());
    Ok(())
}

#[test]
fn test_raw_schema_failure_aborts_without_output() -> Result<()> {
    let env = SieveTestEnv::new()?;
    std::fs::write(
        env.root.join("raw/vendors.jsonl"),
        "{\"vendor_code\": \"V-77\", \"name\": \"Vectortron\", \"country\": \"DE\", \"support_email\": null}\n",
    )?;

    env.sieve()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));

    assert!(parquet_files(&env.out()).is_empty());
    Ok(())
}

#[test]
fn test_missing_raw_dir_fails() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .args(["run", "--raw-dir", "does_not_exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_config_file_disables_partitioning() -> Result<()> {
    let env = SieveTestEnv::new()?;
    std::fs::write(
        env.root.join("sieve.yaml"),
        "output:\n  partition-products: false\n  partition-inventory: false\n",
    )?;

    env.sieve().arg("run").assert().success();

    assert!(env.out().join("dim_product/data.parquet").is_file());
    assert!(env.out().join("fact_inventory/data.parquet").is_file());
    Ok(())
}

#[test]
fn test_env_overrides_out_dir() -> Result<()> {
    let env = SieveTestEnv::new()?;

    env.sieve()
        .arg("run")
        .env("SIEVE_OUT_DIR", "lake")
        .assert()
        .success();

    assert!(env.root.join("lake/run_results.json").is_file());
    assert!(!env.out().exists());
    Ok(())
}

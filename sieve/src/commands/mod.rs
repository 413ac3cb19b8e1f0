// sieve/src/commands/mod.rs

pub mod check;
pub mod run;

use anyhow::Context;
use std::path::Path;
use tracing::debug;

use sieve_core::application::{RunMode, RunReport, run_etl};
use sieve_core::domain::config::EtlConfig;
use sieve_core::infrastructure::{FileSource, ParquetSink, load_config};
use sieve_core::SieveError;

use crate::cli::EtlArgs;

/// Shared by `run` and `check`: resolve config, wire the file adapters, run.
///
/// The outer error is for setup problems (config); the inner one is the run
/// itself, kept typed so its diagnostic can be rendered.
pub(crate) async fn execute_etl(
    args: &EtlArgs,
    mode: RunMode,
) -> anyhow::Result<(EtlConfig, Result<RunReport, SieveError>)> {
    println!("⚙️  Loading configuration...");
    let config = load_config(args.config.as_deref(), Path::new("."), &args.overrides())
        .context("Failed to resolve run configuration")?;
    println!(
        "   Raw: {}  Out: {}  Workers: {}",
        config.raw_dir.display(),
        config.out_dir.display(),
        config.workers
    );

    debug!(?config, "Configuration resolved");

    let source = FileSource::new(&config.raw_dir, config.sources.clone());
    let sink = ParquetSink::new(&config.out_dir, config.output.clone());

    let result = run_etl(&source, &sink, &config, mode).await;
    Ok((config, result))
}

/// Prints a run error with its diagnostic code and help, then exits 1.
pub(crate) fn fail(err: SieveError) -> ! {
    eprintln!("\n💥 PIPELINE ABORTED");
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(1);
}

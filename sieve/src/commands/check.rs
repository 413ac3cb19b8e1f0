// sieve/src/commands/check.rs
//
// USE CASE: Dry run. Same validation and transforms as `run`, no output.

use sieve_core::application::RunMode;

use crate::cli::EtlArgs;
use crate::commands::{execute_etl, fail};
use crate::summary::print_report;

pub async fn execute(args: EtlArgs) -> anyhow::Result<()> {
    let (_, result) = execute_etl(&args, RunMode::DryRun).await?;
    match result {
        Ok(report) => {
            print_report(&report);
            println!("\n✅ Check passed. Nothing was written.");
            Ok(())
        }
        Err(e) => fail(e),
    }
}

// sieve/src/commands/run.rs
//
// USE CASE: Run the ETL and write every output.

use sieve_core::application::RunMode;

use crate::cli::EtlArgs;
use crate::commands::{execute_etl, fail};
use crate::summary::print_report;

pub async fn execute(args: EtlArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    let (config, result) = execute_etl(&args, RunMode::Write).await?;
    match result {
        Ok(report) => {
            print_report(&report);
            println!(
                "\n✨ SUCCESS! Trusted tables written to {} in {:.2?}",
                config.out_dir.display(),
                start.elapsed()
            );
            Ok(())
        }
        Err(e) => fail(e),
    }
}

// sieve/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sieve_core::infrastructure::ConfigOverrides;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Raw product, vendor and inventory tables in; trusted tables and a quarantine log out", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Validates, transforms and writes the trusted tables
    Run {
        #[command(flatten)]
        args: EtlArgs,
    },

    /// 🔎 Validates and transforms without writing anything
    Check {
        #[command(flatten)]
        args: EtlArgs,
    },
}

/// Flags shared by `run` and `check`. Unset flags fall back to sieve.yaml,
/// then to SIEVE_* variables, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct EtlArgs {
    /// Directory holding the raw tables [default: raw]
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Directory receiving trusted tables and quarantine [default: data]
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Threads used for row transforms [default: 1]
    #[arg(long, short = 'j')]
    pub workers: Option<usize>,

    /// Config file (default: ./sieve.yaml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl EtlArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            raw_dir: self.raw_dir.clone(),
            out_dir: self.out_dir.clone(),
            workers: self.workers,
        }
    }
}

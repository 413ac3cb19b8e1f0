// sieve-core/src/infrastructure/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::config::EtlConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["sieve.yaml", "sieve.yml"];

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub raw_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Resolves the run configuration in layers:
/// defaults, then YAML file, then `SIEVE_*` variables, then CLI overrides.
///
/// With an explicit `config_path` the file must exist. Otherwise `sieve.yaml`
/// (or `sieve.yml`) is looked up in `search_dir` and is optional.
#[instrument(skip(overrides))]
pub fn load_config(
    config_path: Option<&Path>,
    search_dir: &Path,
    overrides: &ConfigOverrides,
) -> Result<EtlConfig, InfrastructureError> {
    let mut config = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(InfrastructureError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            read_config_file(path)?
        }
        None => match find_config(search_dir) {
            Some(path) => read_config_file(&path)?,
            None => {
                info!("No sieve.yaml found, using defaults");
                EtlConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut config, overrides);

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn read_config_file(path: &Path) -> Result<EtlConfig, InfrastructureError> {
    info!(path = ?path, "Loading run configuration");
    let content = fs::read_to_string(path)?;
    // An empty file is a valid "all defaults" config.
    if content.trim().is_empty() {
        return Ok(EtlConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// `lookup` abstracts `std::env::var` so tests don't touch the process env.
pub(crate) fn apply_env_overrides<F>(
    config: &mut EtlConfig,
    lookup: F,
) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("SIEVE_RAW_DIR") {
        info!(old = ?config.raw_dir, new = ?val, "Overriding raw dir via ENV");
        config.raw_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("SIEVE_OUT_DIR") {
        info!(old = ?config.out_dir, new = ?val, "Overriding out dir via ENV");
        config.out_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("SIEVE_WORKERS") {
        let workers = val.trim().parse::<usize>().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "SIEVE_WORKERS must be a positive integer, got '{}'",
                val
            ))
        })?;
        info!(old = config.workers, new = workers, "Overriding workers via ENV");
        config.workers = workers;
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut EtlConfig, overrides: &ConfigOverrides) {
    if let Some(raw_dir) = &overrides.raw_dir {
        config.raw_dir = raw_dir.clone();
    }
    if let Some(out_dir) = &overrides.out_dir {
        config.out_dir = out_dir.clone();
    }
    if let Some(workers) = overrides.workers {
        if workers == 0 {
            warn!("--workers 0 requested, validation will reject it");
        }
        config.workers = workers;
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CliError, CliResult};
use treasury_config::{load_treasury_config, resolve_config_path, TreasuryConfig};
use treasury_multisig::{LogSink, MultisigEngine, OwnerRegistry, SledLedger, SledVault};

pub struct CliContext {
    config_path: PathBuf,
    pub verbose: u8,
}

impl CliContext {
    pub fn new(config: Option<&Path>, verbose: u8) -> Self {
        Self {
            config_path: resolve_config_path(config),
            verbose,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_config(&self) -> CliResult<TreasuryConfig> {
        if !self.config_path.exists() {
            return Err(CliError::Config(format!(
                "No config at {}. Run `treasury init` first or pass --config",
                self.config_path.display()
            )));
        }
        load_treasury_config(&self.config_path).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Opens the persistent ledger and vault named by the config and wires an engine over them.
    pub fn open_engine(&self) -> CliResult<MultisigEngine> {
        let config = self.load_config()?;
        let registry = OwnerRegistry::from_hex(&config.owners, config.threshold)?;

        let storage_path = config.storage_path_relative_to(&self.config_path);
        if self.verbose > 0 {
            println!("Opening treasury store at: {}", storage_path.display());
        }
        std::fs::create_dir_all(&storage_path)?;
        let db = sled::open(&storage_path).map_err(|e| CliError::Storage(e.to_string()))?;

        let ledger = SledLedger::from_db(&db).map_err(|e| CliError::Storage(e.to_string()))?;
        let vault = SledVault::from_db(&db).map_err(|e| CliError::Storage(e.to_string()))?;

        log::debug!(
            "treasury '{}' loaded: {} owners, threshold {}, policy {}",
            config.name,
            registry.len(),
            registry.threshold(),
            config.execution.policy
        );

        Ok(MultisigEngine::new(registry, Box::new(ledger), Arc::new(vault))
            .with_policy(config.execution.policy)
            .with_event_sink(Arc::new(LogSink)))
    }
}

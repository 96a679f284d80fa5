use clap::Args;
use colored::Colorize;

use crate::context::CliContext;
use crate::error::{CliError, CliResult};
use treasury_config::{ExecutionConfig, StorageConfig, TreasuryConfig};
use treasury_multisig::OwnerRegistry;
use treasury_types::{Address, ExecutionPolicy};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Owner address; repeat for each committee member (at least 3)
    #[arg(long = "owner", required = true)]
    pub owners: Vec<Address>,

    /// Confirmations required before a transfer may execute
    #[arg(long)]
    pub threshold: usize,

    /// explicit or auto_on_threshold
    #[arg(long, default_value = "explicit")]
    pub policy: ExecutionPolicy,

    /// Committee label
    #[arg(long, default_value = "treasury")]
    pub name: String,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(ctx: &CliContext, args: &InitArgs) -> CliResult {
    let path = ctx.config_path();
    if path.exists() && !args.force {
        return Err(CliError::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    // Same validation the engine applies at startup
    let registry = OwnerRegistry::new(args.owners.clone(), args.threshold)?;

    let config = TreasuryConfig {
        name: args.name.clone(),
        owners: registry.owners().iter().map(|o| o.to_string()).collect(),
        threshold: registry.threshold(),
        execution: ExecutionConfig { policy: args.policy },
        storage: StorageConfig::default(),
    };

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    std::fs::write(path, config.to_toml_string()?)?;

    println!(
        "{} {}-of-{} treasury config written to {}",
        "Created".green(),
        registry.threshold(),
        registry.len(),
        path.display()
    );
    Ok(())
}

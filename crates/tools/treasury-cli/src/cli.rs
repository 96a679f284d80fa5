use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::commands::{init::InitArgs, treasury::DepositArgs, tx::{ListArgs, SubmitArgs}};
use treasury_types::{Address, TxId};

#[derive(Parser, Debug)]
#[command(name = "treasury", author, version, about = "M-of-N treasury multisig operator tool", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global_opts: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Path to the treasury config file (defaults to $TREASURY_CONFIG_PATH or ./treasury.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a new treasury config file
    Init(InitArgs),

    /// Show the committee, threshold and execution policy
    Owners,

    /// Propose a transfer; counts as the proposer's confirmation
    Submit(SubmitArgs),

    /// Confirm a pending transaction
    Confirm {
        /// Confirming owner address
        #[arg(long)]
        from: Address,

        /// Transaction id
        #[arg(long)]
        id: TxId,
    },

    /// Withdraw a confirmation before execution
    Revoke {
        /// Revoking owner address
        #[arg(long)]
        from: Address,

        /// Transaction id
        #[arg(long)]
        id: TxId,
    },

    /// Execute an authorized transaction
    Execute {
        /// Transaction id
        #[arg(long)]
        id: TxId,
    },

    /// Show a single transaction
    Show {
        /// Transaction id
        #[arg(long)]
        id: TxId,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List transactions
    List(ListArgs),

    /// Fund the treasury (anyone may deposit)
    Deposit(DepositArgs),

    /// Show the treasury balance
    Balance,
}

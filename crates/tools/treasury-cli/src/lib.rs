pub mod cli;
pub mod commands;
pub mod context;
pub mod error;

pub use cli::{Cli, Commands, GlobalOpts};
pub use context::CliContext;
pub use error::{CliError, CliResult};

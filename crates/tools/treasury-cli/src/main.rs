use clap::Parser;
use colored::Colorize;

use treasury_cli::commands::{init, treasury, tx};
use treasury_cli::{Cli, CliContext, CliResult, Commands};

async fn run(cli: Cli) -> CliResult {
    let ctx = CliContext::new(cli.global_opts.config.as_deref(), cli.global_opts.verbose);

    match &cli.command {
        Commands::Init(args) => init::handle_init(&ctx, args),
        Commands::Owners => treasury::handle_owners(&ctx),
        Commands::Submit(args) => tx::handle_submit(&ctx, args).await,
        Commands::Confirm { from, id } => tx::handle_confirm(&ctx, *from, *id).await,
        Commands::Revoke { from, id } => tx::handle_revoke(&ctx, *from, *id).await,
        Commands::Execute { id } => tx::handle_execute(&ctx, *id).await,
        Commands::Show { id, json } => tx::handle_show(&ctx, *id, *json).await,
        Commands::List(args) => tx::handle_list(&ctx, args).await,
        Commands::Deposit(args) => treasury::handle_deposit(&ctx, args).await,
        Commands::Balance => treasury::handle_balance(&ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.global_opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

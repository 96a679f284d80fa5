use clap::Args;
use colored::Colorize;

use super::parse_amount;
use crate::context::CliContext;
use crate::error::CliResult;
use treasury_multisig::Transaction;
use treasury_types::{format_units, Address, Amount};

#[derive(Args, Debug)]
pub struct DepositArgs {
    /// Depositor address; need not be an owner
    #[arg(long)]
    pub from: Address,

    /// Amount in native units
    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,
}

pub fn handle_owners(ctx: &CliContext) -> CliResult {
    let engine = ctx.open_engine()?;
    println!(
        "Threshold: {} of {} ({} execution)",
        engine.threshold(),
        engine.owners().len(),
        engine.policy()
    );
    for (idx, owner) in engine.owners().iter().enumerate() {
        println!("  {}. {}", idx + 1, owner);
    }
    Ok(())
}

pub async fn handle_deposit(ctx: &CliContext, args: &DepositArgs) -> CliResult {
    let engine = ctx.open_engine()?;
    engine.deposit(args.from, args.amount).await?;
    println!(
        "{} {} from {}; treasury balance is now {}",
        "Deposited".green(),
        format_units(args.amount),
        args.from,
        format_units(engine.treasury_balance().await?)
    );
    Ok(())
}

pub async fn handle_balance(ctx: &CliContext) -> CliResult {
    let engine = ctx.open_engine()?;
    let balance = engine.treasury_balance().await?;
    let pending = engine.pending().await?;
    let committed = match pending_outflow(&pending) {
        Some(total) => format_units(total),
        None => format!("more than {}", format_units(Amount::MAX)),
    };
    println!("Treasury balance: {}", format_units(balance));
    println!(
        "Pending outflow:  {} across {} transaction(s)",
        committed,
        pending.len()
    );
    Ok(())
}

/// Total still waiting to leave the treasury; `None` once it exceeds `Amount::MAX`.
fn pending_outflow(pending: &[Transaction]) -> Option<Amount> {
    pending
        .iter()
        .try_fold(0 as Amount, |total, tx| total.checked_add(tx.amount))
}

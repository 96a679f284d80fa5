use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{parse_amount, parse_payload, HexPayload};
use crate::context::CliContext;
use crate::error::CliResult;
use treasury_multisig::{MultisigEngine, Transaction, TransactionFilter, TxStatus};
use treasury_types::{format_units, Address, Amount, TxId};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Proposing owner address
    #[arg(long)]
    pub from: Address,

    /// Destination address
    #[arg(long)]
    pub to: Address,

    /// Amount in native units, e.g. 0.5
    #[arg(long, value_parser = parse_amount)]
    pub amount: Amount,

    /// Hex call data handed to the executor; omit for a plain transfer
    #[arg(long, value_parser = parse_payload)]
    pub data: Option<HexPayload>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show transactions in this state (proposed, authorized, executed)
    #[arg(long)]
    pub status: Option<TxStatus>,

    /// Only show transfers to this address
    #[arg(long)]
    pub to: Option<Address>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Serializable snapshot for `--json` output.
#[derive(Serialize)]
struct TransactionView {
    id: TxId,
    status: TxStatus,
    target: String,
    amount: String,
    amount_base_units: String,
    payload: String,
    confirmations: usize,
    threshold: usize,
    confirmed_by: Vec<String>,
}

impl TransactionView {
    fn new(tx: &Transaction, threshold: usize) -> Self {
        Self {
            id: tx.id,
            status: tx.status(threshold),
            target: tx.target.to_string(),
            amount: format_units(tx.amount),
            amount_base_units: tx.amount.to_string(),
            payload: format!("0x{}", hex::encode(&tx.payload)),
            confirmations: tx.confirmation_count(),
            threshold,
            confirmed_by: tx.confirmers().map(|a| a.to_string()).collect(),
        }
    }
}

fn status_label(status: TxStatus) -> colored::ColoredString {
    match status {
        TxStatus::Proposed => status.to_string().yellow(),
        TxStatus::Authorized => status.to_string().cyan(),
        TxStatus::Executed => status.to_string().green(),
    }
}

fn print_transaction(engine: &MultisigEngine, tx: &Transaction) {
    let threshold = engine.threshold();
    println!("Transaction #{}", tx.id.to_string().bold());
    println!("  Status:        {}", status_label(tx.status(threshold)));
    println!("  Target:        {}", tx.target);
    println!("  Amount:        {}", format_units(tx.amount));
    if tx.is_plain_transfer() {
        println!("  Payload:       0x (plain transfer)");
    } else {
        println!("  Payload:       0x{}", hex::encode(&tx.payload));
    }
    println!("  Confirmations: {}/{}", tx.confirmation_count(), threshold);
    for (owner, confirmed) in tx.confirmation_flags(engine.owners()) {
        let mark = if confirmed { "[x]".green() } else { "[ ]".normal() };
        println!("    {} {}", mark, owner);
    }
}

pub async fn handle_submit(ctx: &CliContext, args: &SubmitArgs) -> CliResult {
    let engine = ctx.open_engine()?;
    let payload = args.data.clone().map(|p| p.0).unwrap_or_default();
    let id = engine.submit(args.from, args.to, args.amount, payload).await?;
    let tx = engine.get(id).await?;

    println!(
        "{} transaction #{}: {} to {} ({}/{} confirmations)",
        "Submitted".green(),
        id,
        format_units(args.amount),
        args.to,
        tx.confirmation_count(),
        engine.threshold()
    );
    if tx.is_executed() {
        println!("{} transaction #{}", "Executed".green(), id);
    }
    Ok(())
}

pub async fn handle_confirm(ctx: &CliContext, from: Address, id: TxId) -> CliResult {
    let engine = ctx.open_engine()?;
    engine.confirm(from, id).await?;
    let tx = engine.get(id).await?;

    println!(
        "{} transaction #{} ({}/{} confirmations)",
        "Confirmed".green(),
        id,
        tx.confirmation_count(),
        engine.threshold()
    );
    match tx.status(engine.threshold()) {
        TxStatus::Executed => println!("{} transaction #{}", "Executed".green(), id),
        TxStatus::Authorized => println!("Transaction #{} is ready to execute", id),
        TxStatus::Proposed => {}
    }
    Ok(())
}

pub async fn handle_revoke(ctx: &CliContext, from: Address, id: TxId) -> CliResult {
    let engine = ctx.open_engine()?;
    engine.revoke(from, id).await?;
    let tx = engine.get(id).await?;
    println!(
        "{} confirmation on transaction #{} ({}/{} confirmations)",
        "Revoked".yellow(),
        id,
        tx.confirmation_count(),
        engine.threshold()
    );
    Ok(())
}

pub async fn handle_execute(ctx: &CliContext, id: TxId) -> CliResult {
    let engine = ctx.open_engine()?;
    engine.execute(id).await?;
    let tx = engine.get(id).await?;
    println!(
        "{} transaction #{}: {} sent to {}",
        "Executed".green(),
        id,
        format_units(tx.amount),
        tx.target
    );
    Ok(())
}

pub async fn handle_show(ctx: &CliContext, id: TxId, json: bool) -> CliResult {
    let engine = ctx.open_engine()?;
    let tx = engine.get(id).await?;
    if json {
        let view = TransactionView::new(&tx, engine.threshold());
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_transaction(&engine, &tx);
    }
    Ok(())
}

pub async fn handle_list(ctx: &CliContext, args: &ListArgs) -> CliResult {
    let engine = ctx.open_engine()?;
    let filter = TransactionFilter {
        status: args.status,
        target: args.to,
        ..Default::default()
    };
    let txs = engine.list(&filter).await?;
    let threshold = engine.threshold();

    if args.json {
        let views: Vec<_> = txs.iter().map(|tx| TransactionView::new(tx, threshold)).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if txs.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    println!("{:<6} {:<12} {:<44} {:>24} {}", "ID", "STATUS", "TARGET", "AMOUNT", "CONF");
    for tx in &txs {
        println!(
            "{:<6} {:<12} {:<44} {:>24} {}/{}",
            tx.id,
            tx.status(threshold).to_string(),
            tx.target.to_string(),
            format_units(tx.amount),
            tx.confirmation_count(),
            threshold
        );
    }
    Ok(())
}

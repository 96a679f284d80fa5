use thiserror::Error;
use treasury_multisig::{MultisigError, TransferError};
use std::io;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("{}", describe_multisig(.0))]
    Multisig(#[from] MultisigError),

    #[error("Generic Error: {0}")]
    Any(#[from] anyhow::Error),
}

/// Operator-facing wording for engine failures.
fn describe_multisig(err: &MultisigError) -> String {
    match err {
        MultisigError::NotOwner { caller } => {
            format!("{} is not an authorized signer of this treasury", caller)
        }
        MultisigError::AlreadyExecuted(id) => {
            format!("Transaction #{} has already been executed", id)
        }
        MultisigError::AlreadyConfirmed { id, owner } => {
            format!("{} has already confirmed transaction #{}", owner, id)
        }
        MultisigError::NotConfirmed { id, owner } => {
            format!("{} has not confirmed transaction #{}; nothing to revoke", owner, id)
        }
        MultisigError::InsufficientConfirmations { id, required, found } => format!(
            "Transaction #{} needs {} confirmations before it can execute (has {})",
            id, required, found
        ),
        MultisigError::NotFound(id) => format!("Transaction #{} does not exist", id),
        MultisigError::TransferFailed(TransferError::InsufficientFunds { .. }) => format!(
            "{}. The transaction is unchanged; deposit funds and execute again",
            err
        ),
        MultisigError::TransferFailed(_) => {
            format!("{}. The transaction is unchanged and can be retried", err)
        }
        other => other.to_string(),
    }
}

pub type CliResult<T = ()> = Result<T, CliError>;

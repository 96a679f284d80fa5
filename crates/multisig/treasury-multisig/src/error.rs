use crate::executor::TransferError;
use crate::ledger::LedgerError;
use thiserror::Error;
use treasury_types::{Address, TxId};

/// Failures reported by the authorization engine.
///
/// Every operation returns these synchronously; `TransferFailed` is the only
/// one after which the same call may succeed on retry.
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("{caller} is not an authorized signer")]
    NotOwner { caller: Address },

    #[error("Invalid owner set: {0}")]
    InvalidOwnerSet(String),

    #[error("Invalid threshold {threshold}: must be between 1 and {owners}")]
    InvalidThreshold { threshold: usize, owners: usize },

    #[error("Transaction {0} not found")]
    NotFound(TxId),

    #[error("Transaction {id} is already confirmed by {owner}")]
    AlreadyConfirmed { id: TxId, owner: Address },

    #[error("Transaction {id} has no confirmation from {owner} to revoke")]
    NotConfirmed { id: TxId, owner: Address },

    #[error("Transaction {0} has already been executed")]
    AlreadyExecuted(TxId),

    #[error("Transaction {id} cannot execute: {found} of {required} required confirmations")]
    InsufficientConfirmations { id: TxId, required: usize, found: usize },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Ledger storage error: {0}")]
    Storage(String),
}

impl From<LedgerError> for MultisigError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => MultisigError::NotFound(id),
            other => MultisigError::Storage(other.to_string()),
        }
    }
}

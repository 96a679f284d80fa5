use crate::transaction::Transaction;
use thiserror::Error;
use treasury_types::{Address, Amount, TxId};

pub mod memory;
#[cfg(feature = "persistence")]
pub mod sled;

pub use memory::InMemoryLedger;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Transaction {0} not found")]
    NotFound(TxId),

    #[error("Out of sequence insert: expected id {expected}, got {found}")]
    OutOfSequence { expected: TxId, found: TxId },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Append-only storage of transaction records, keyed by sequential id.
///
/// The store performs no authorization of its own. `update` only replaces an
/// existing record with a newer snapshot, and the only removal is `retract`
/// of the newest record.
pub trait LedgerStore: Send + Sync {
    /// Id the next inserted record must carry.
    fn next_id(&self) -> TxId;

    /// Stores a new record. Fails unless `tx.id == self.next_id()`.
    fn insert(&mut self, tx: Transaction) -> Result<TxId, LedgerError>;

    fn get(&self, id: TxId) -> Result<Transaction, LedgerError>;

    fn update(&mut self, tx: &Transaction) -> Result<(), LedgerError>;

    /// Drops the newest record so its id is issued again. Any other id is refused.
    fn retract(&mut self, id: TxId) -> Result<(), LedgerError>;

    fn count(&self) -> u64;

    /// All records ordered by id.
    fn list(&self) -> Result<Vec<Transaction>, LedgerError>;

    /// Records a fresh transaction with no confirmations and returns its id.
    fn append(&mut self, target: Address, amount: Amount, payload: Vec<u8>) -> Result<TxId, LedgerError> {
        let tx = Transaction::new(self.next_id(), target, amount, payload);
        self.insert(tx)
    }
}

/// Checks that `id` names the newest record of a store whose next id is `next`.
pub(crate) fn ensure_newest(id: TxId, next: TxId) -> Result<(), LedgerError> {
    match next.checked_sub(1) {
        Some(newest) if id == newest => Ok(()),
        Some(newest) if id < newest => Err(LedgerError::OutOfSequence {
            expected: newest,
            found: id,
        }),
        _ => Err(LedgerError::NotFound(id)),
    }
}

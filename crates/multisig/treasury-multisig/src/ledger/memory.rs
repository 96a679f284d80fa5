use super::{ensure_newest, LedgerError, LedgerStore};
use crate::transaction::Transaction;
use treasury_types::TxId;

/// Arena-backed ledger; the transaction id is the vector index.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    transactions: Vec<Transaction>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: TxId) -> Option<usize> {
        usize::try_from(id).ok().filter(|idx| *idx < self.transactions.len())
    }
}

impl LedgerStore for InMemoryLedger {
    fn next_id(&self) -> TxId {
        self.transactions.len() as TxId
    }

    fn insert(&mut self, tx: Transaction) -> Result<TxId, LedgerError> {
        let expected = self.next_id();
        if tx.id != expected {
            return Err(LedgerError::OutOfSequence {
                expected,
                found: tx.id,
            });
        }
        self.transactions.push(tx);
        Ok(expected)
    }

    fn get(&self, id: TxId) -> Result<Transaction, LedgerError> {
        self.slot(id)
            .map(|idx| self.transactions[idx].clone())
            .ok_or(LedgerError::NotFound(id))
    }

    fn update(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        let idx = self.slot(tx.id).ok_or(LedgerError::NotFound(tx.id))?;
        self.transactions[idx] = tx.clone();
        Ok(())
    }

    fn retract(&mut self, id: TxId) -> Result<(), LedgerError> {
        ensure_newest(id, self.next_id())?;
        self.transactions.pop();
        Ok(())
    }

    fn count(&self) -> u64 {
        self.transactions.len() as u64
    }

    fn list(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.transactions.clone())
    }
}

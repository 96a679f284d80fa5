use super::{ensure_newest, LedgerError, LedgerStore};
use crate::transaction::Transaction;
use std::path::Path;
use treasury_types::TxId;

const TRANSACTIONS_TREE: &str = "transactions";

impl From<sled::Error> for LedgerError {
    fn from(e: sled::Error) -> Self {
        LedgerError::Backend(e.to_string())
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

/// Durable ledger on a sled tree. Keys are big-endian ids so iteration
/// order is id order; values are bincode-encoded transactions.
///
/// The next id is read from the last key when the ledger opens and tracked
/// in memory afterwards; this instance must be the tree's only writer.
pub struct SledLedger {
    db: sled::Db,
    tree: sled::Tree,
    next: TxId,
}

impl SledLedger {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let db = sled::open(path)?;
        Self::from_db(&db)
    }

    /// Uses an already opened database, so the ledger can share it with a vault.
    pub fn from_db(db: &sled::Db) -> Result<Self, LedgerError> {
        let tree = db.open_tree(TRANSACTIONS_TREE)?;
        let next = match tree.last()? {
            Some((key, _)) => Self::decode_key(&key)? + 1,
            None => 0,
        };
        Ok(Self {
            db: db.clone(),
            tree,
            next,
        })
    }

    fn key(id: TxId) -> [u8; 8] {
        id.to_be_bytes()
    }

    fn decode_key(key: &[u8]) -> Result<TxId, LedgerError> {
        <[u8; 8]>::try_from(key)
            .map(TxId::from_be_bytes)
            .map_err(|_| LedgerError::Serialization(format!("malformed ledger key of {} bytes", key.len())))
    }

    fn write(&self, tx: &Transaction) -> Result<(), LedgerError> {
        let encoded = bincode::serialize(tx)?;
        self.tree.insert(Self::key(tx.id), encoded)?;
        self.db.flush()?;
        Ok(())
    }
}

impl LedgerStore for SledLedger {
    fn next_id(&self) -> TxId {
        self.next
    }

    fn insert(&mut self, tx: Transaction) -> Result<TxId, LedgerError> {
        let expected = self.next_id();
        if tx.id != expected {
            return Err(LedgerError::OutOfSequence {
                expected,
                found: tx.id,
            });
        }
        self.write(&tx)?;
        self.next += 1;
        Ok(expected)
    }

    fn get(&self, id: TxId) -> Result<Transaction, LedgerError> {
        match self.tree.get(Self::key(id))? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Err(LedgerError::NotFound(id)),
        }
    }

    fn update(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        if !self.tree.contains_key(Self::key(tx.id))? {
            return Err(LedgerError::NotFound(tx.id));
        }
        self.write(tx)
    }

    fn retract(&mut self, id: TxId) -> Result<(), LedgerError> {
        ensure_newest(id, self.next)?;
        self.tree.remove(Self::key(id))?;
        self.db.flush()?;
        self.next = id;
        Ok(())
    }

    fn count(&self) -> u64 {
        self.next
    }

    fn list(&self) -> Result<Vec<Transaction>, LedgerError> {
        self.tree
            .iter()
            .values()
            .map(|value| -> Result<Transaction, LedgerError> {
                let bytes = value?;
                Ok(bincode::deserialize(&bytes)?)
            })
            .collect()
    }
}

use super::{CallHandler, TransferError, TransferExecutor, TransferRecord, VaultState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use treasury_types::{Address, Amount};

const VAULT_TREE: &str = "vault";
const STATE_KEY: &[u8] = b"state";

/// Vault whose balance and payout history live in a sled database.
///
/// The whole state is one record, so each deposit or transfer lands in a
/// single atomic insert.
pub struct SledVault {
    db: sled::Db,
    tree: sled::Tree,
    write_gate: Mutex<()>,
    call_handler: Option<Arc<dyn CallHandler>>,
}

fn backend<E: std::fmt::Display>(e: E) -> TransferError {
    TransferError::Backend(e.to_string())
}

impl SledVault {
    pub fn from_db(db: &sled::Db) -> Result<Self, TransferError> {
        let tree = db.open_tree(VAULT_TREE).map_err(backend)?;
        Ok(Self {
            db: db.clone(),
            tree,
            write_gate: Mutex::new(()),
            call_handler: None,
        })
    }

    pub fn with_call_handler(mut self, handler: Arc<dyn CallHandler>) -> Self {
        self.call_handler = Some(handler);
        self
    }

    fn load(&self) -> Result<VaultState, TransferError> {
        match self.tree.get(STATE_KEY).map_err(backend)? {
            Some(bytes) => bincode::deserialize(&bytes).map_err(backend),
            None => Ok(VaultState::default()),
        }
    }

    fn store(&self, state: &VaultState) -> Result<(), TransferError> {
        let encoded = bincode::serialize(state).map_err(backend)?;
        self.tree.insert(STATE_KEY, encoded).map_err(backend)?;
        self.db.flush().map_err(backend)?;
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<TransferRecord>, TransferError> {
        Ok(self.load()?.history)
    }

    pub fn credited_to(&self, target: &Address) -> Result<Amount, TransferError> {
        Ok(self.load()?.credited.get(target).copied().unwrap_or(0))
    }
}

#[async_trait]
impl TransferExecutor for SledVault {
    async fn transfer(&self, target: &Address, amount: Amount, payload: &[u8]) -> Result<(), TransferError> {
        let _guard = self.write_gate.lock().await;
        let mut state = self.load()?;
        state.apply_transfer(target, amount, payload, self.call_handler.as_ref())?;
        self.store(&state)
    }

    async fn deposit(&self, depositor: &Address, amount: Amount) -> Result<(), TransferError> {
        let _guard = self.write_gate.lock().await;
        let mut state = self.load()?;
        state.apply_deposit(depositor, amount)?;
        self.store(&state)
    }

    async fn balance(&self) -> Result<Amount, TransferError> {
        Ok(self.load()?.balance)
    }
}

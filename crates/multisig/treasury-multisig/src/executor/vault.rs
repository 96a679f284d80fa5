use super::{CallHandler, TransferError, TransferExecutor, TransferRecord, VaultState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use treasury_types::{Address, Amount};

/// In-memory treasury holding a native balance.
pub struct TreasuryVault {
    state: RwLock<VaultState>,
    call_handler: Option<Arc<dyn CallHandler>>,
}

impl TreasuryVault {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(VaultState::default()),
            call_handler: None,
        }
    }

    pub fn with_balance(balance: Amount) -> Self {
        Self {
            state: RwLock::new(VaultState {
                balance,
                ..Default::default()
            }),
            call_handler: None,
        }
    }

    pub fn with_call_handler(mut self, handler: Arc<dyn CallHandler>) -> Self {
        self.call_handler = Some(handler);
        self
    }

    /// Total amount this vault has paid out to `target`.
    pub async fn credited_to(&self, target: &Address) -> Amount {
        self.state.read().await.credited.get(target).copied().unwrap_or(0)
    }

    pub async fn deposited_by(&self, depositor: &Address) -> Amount {
        self.state.read().await.deposited.get(depositor).copied().unwrap_or(0)
    }

    pub async fn history(&self) -> Vec<TransferRecord> {
        self.state.read().await.history.clone()
    }
}

impl Default for TreasuryVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferExecutor for TreasuryVault {
    async fn transfer(&self, target: &Address, amount: Amount, payload: &[u8]) -> Result<(), TransferError> {
        let mut state = self.state.write().await;
        state.apply_transfer(target, amount, payload, self.call_handler.as_ref())
    }

    async fn deposit(&self, depositor: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.write().await;
        state.apply_deposit(depositor, amount)
    }

    async fn balance(&self) -> Result<Amount, TransferError> {
        Ok(self.state.read().await.balance)
    }
}

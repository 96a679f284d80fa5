use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use treasury_types::{Address, Amount};

pub mod vault;
#[cfg(feature = "persistence")]
pub mod sled_vault;

pub use vault::TreasuryVault;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient treasury funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Call rejected: {0}")]
    CallRejected(String),

    #[error("Invalid transfer amount: {0}")]
    InvalidAmount(String),

    #[error("Executor backend error: {0}")]
    Backend(String),
}

/// Moves treasury funds once the engine has authorized a transaction.
///
/// Implementations must be all-or-nothing: either the asset movement and any
/// payload-triggered effect both happen, or neither does.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn transfer(&self, target: &Address, amount: Amount, payload: &[u8]) -> Result<(), TransferError>;

    /// Inbound funding; not gated by the committee.
    async fn deposit(&self, depositor: &Address, amount: Amount) -> Result<(), TransferError>;

    async fn balance(&self) -> Result<Amount, TransferError>;
}

/// Interprets the payload of a non-plain transfer.
///
/// Runs before any balance is touched; an error aborts the whole transfer.
pub trait CallHandler: Send + Sync {
    fn handle(&self, target: &Address, amount: Amount, payload: &[u8]) -> Result<(), TransferError>;
}

/// One completed outbound transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub target: Address,
    pub amount: Amount,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
    pub at: DateTime<Utc>,
}

/// Balance bookkeeping shared by the vault backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct VaultState {
    pub balance: Amount,
    pub credited: BTreeMap<Address, Amount>,
    pub deposited: BTreeMap<Address, Amount>,
    pub history: Vec<TransferRecord>,
}

impl VaultState {
    pub fn apply_deposit(&mut self, depositor: &Address, amount: Amount) -> Result<(), TransferError> {
        if amount == 0 {
            return Err(TransferError::InvalidAmount("deposit must be > 0".to_string()));
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::InvalidAmount("treasury balance overflow".to_string()))?;
        let deposited = self
            .deposited
            .get(depositor)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| TransferError::InvalidAmount("depositor total overflow".to_string()))?;

        self.balance = balance;
        self.deposited.insert(*depositor, deposited);
        Ok(())
    }

    /// Validates everything first, then mutates; a failed call leaves the state untouched.
    pub fn apply_transfer(
        &mut self,
        target: &Address,
        amount: Amount,
        payload: &[u8],
        call_handler: Option<&Arc<dyn CallHandler>>,
    ) -> Result<(), TransferError> {
        if amount > self.balance {
            return Err(TransferError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        let credited = self
            .credited
            .get(target)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| TransferError::InvalidAmount("target balance overflow".to_string()))?;

        if !payload.is_empty() {
            match call_handler {
                Some(handler) => handler.handle(target, amount, payload)?,
                None => {
                    return Err(TransferError::CallRejected(
                        "payload given but no call handler is installed".to_string(),
                    ))
                }
            }
        }

        self.balance -= amount;
        self.credited.insert(*target, credited);
        self.history.push(TransferRecord {
            target: *target,
            amount,
            payload: payload.to_vec(),
            at: Utc::now(),
        });
        Ok(())
    }
}

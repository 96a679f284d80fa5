use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use treasury_types::{Address, Amount, TxId};

/// Lifecycle position of a transaction relative to the committee threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Fewer confirmations than the threshold
    Proposed,
    /// Enough confirmations, waiting for execution
    Authorized,
    /// Transfer performed; terminal
    Executed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Proposed => write!(f, "proposed"),
            TxStatus::Authorized => write!(f, "authorized"),
            TxStatus::Executed => write!(f, "executed"),
        }
    }
}

impl std::str::FromStr for TxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proposed" => Ok(TxStatus::Proposed),
            "authorized" => Ok(TxStatus::Authorized),
            "executed" => Ok(TxStatus::Executed),
            other => Err(format!(
                "Unsupported status: {}. Valid values: proposed, authorized, executed",
                other
            )),
        }
    }
}

/// A proposed outbound transfer and the confirmations collected for it.
///
/// The confirmation count is always derived from the set of confirming
/// owners, so it cannot drift from the flags. Only the engine mutates a
/// transaction; everything outside the crate sees read-only snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub target: Address,
    pub amount: Amount,
    /// Opaque call data handed to the executor; empty means plain transfer
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
    confirmations: BTreeSet<Address>,
    executed: bool,
}

impl Transaction {
    pub fn new(id: TxId, target: Address, amount: Amount, payload: Vec<u8>) -> Self {
        Self {
            id,
            target,
            amount,
            payload,
            confirmations: BTreeSet::new(),
            executed: false,
        }
    }

    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.confirmations.contains(owner)
    }

    /// Owners that currently confirm this transaction, in address order.
    pub fn confirmers(&self) -> impl Iterator<Item = &Address> {
        self.confirmations.iter()
    }

    /// Per-owner confirmation flags in committee order.
    pub fn confirmation_flags(&self, owners: &[Address]) -> Vec<(Address, bool)> {
        owners
            .iter()
            .map(|owner| (*owner, self.is_confirmed_by(owner)))
            .collect()
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn is_plain_transfer(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn status(&self, threshold: usize) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.confirmation_count() >= threshold {
            TxStatus::Authorized
        } else {
            TxStatus::Proposed
        }
    }

    /// Returns false if the owner had already confirmed.
    pub(crate) fn add_confirmation(&mut self, owner: Address) -> bool {
        self.confirmations.insert(owner)
    }

    /// Returns false if the owner had not confirmed.
    pub(crate) fn remove_confirmation(&mut self, owner: &Address) -> bool {
        self.confirmations.remove(owner)
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
    }
}

/// Criteria for listing ledger entries. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TxStatus>,
    pub target: Option<Address>,
    /// Skip executed transactions
    pub pending_only: bool,
}

impl TransactionFilter {
    pub fn with_status(status: TxStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Everything not yet executed, whether authorized or not.
    pub fn pending() -> Self {
        Self {
            pending_only: true,
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &Transaction, threshold: usize) -> bool {
        !(self.pending_only && tx.is_executed())
            && self.status.map_or(true, |s| tx.status(threshold) == s)
            && self.target.as_ref().map_or(true, |t| &tx.target == t)
    }
}

//! treasury-multisig: M-of-N authorization of outbound treasury transfers.
//!
//! A fixed committee of owners proposes, confirms and revokes transfers. A
//! transfer runs through the [`TransferExecutor`] only once enough owners have
//! confirmed it, and at most once.

pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod registry;
pub mod transaction;

pub use engine::MultisigEngine;
pub use error::MultisigError;
pub use events::{EventLog, EventRecord, EventSink, FanoutSink, LogSink, TreasuryEvent};
pub use executor::{CallHandler, TransferError, TransferExecutor, TransferRecord, TreasuryVault};
pub use ledger::{InMemoryLedger, LedgerError, LedgerStore};
pub use registry::{OwnerRegistry, MIN_OWNERS};
pub use transaction::{Transaction, TransactionFilter, TxStatus};

#[cfg(feature = "persistence")]
pub use executor::sled_vault::SledVault;
#[cfg(feature = "persistence")]
pub use ledger::sled::SledLedger;

pub use treasury_types::{Address, Amount, ExecutionPolicy, TxId};

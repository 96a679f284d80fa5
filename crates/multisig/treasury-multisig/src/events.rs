use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use treasury_types::{format_units, Address, Amount, TxId};

/// State transitions published for dashboards and audit trails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreasuryEvent {
    Submission {
        id: TxId,
        caller: Address,
        target: Address,
        amount: Amount,
    },
    Confirmation {
        id: TxId,
        owner: Address,
    },
    Revocation {
        id: TxId,
        owner: Address,
    },
    Execution {
        id: TxId,
    },
    Deposit {
        depositor: Address,
        amount: Amount,
    },
}

impl TreasuryEvent {
    /// Transaction the event belongs to; deposits have none.
    pub fn tx_id(&self) -> Option<TxId> {
        match self {
            TreasuryEvent::Submission { id, .. }
            | TreasuryEvent::Confirmation { id, .. }
            | TreasuryEvent::Revocation { id, .. }
            | TreasuryEvent::Execution { id } => Some(*id),
            TreasuryEvent::Deposit { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub at: DateTime<Utc>,
    pub event: TreasuryEvent,
}

/// Receives events after the corresponding state change is committed.
///
/// Sinks are a side channel: they cannot fail an operation and are never
/// read back by the engine.
pub trait EventSink: Send + Sync {
    fn record(&self, event: TreasuryEvent);
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct EventLog {
    next_sequence: AtomicU64,
    records: Mutex<Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn events(&self) -> Vec<TreasuryEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }

    pub fn events_for(&self, id: TxId) -> Vec<TreasuryEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.tx_id() == Some(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn record(&self, event: TreasuryEvent) {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        records.push(EventRecord {
            sequence,
            at: Utc::now(),
            event,
        });
    }
}

/// Writes each event through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: TreasuryEvent) {
        match &event {
            TreasuryEvent::Submission { id, caller, target, amount } => log::info!(
                "tx {} submitted by {}: {} to {}",
                id,
                caller,
                format_units(*amount),
                target
            ),
            TreasuryEvent::Confirmation { id, owner } => log::info!("tx {} confirmed by {}", id, owner),
            TreasuryEvent::Revocation { id, owner } => log::info!("tx {} revoked by {}", id, owner),
            TreasuryEvent::Execution { id } => log::info!("tx {} executed", id),
            TreasuryEvent::Deposit { depositor, amount } => {
                log::info!("deposit of {} from {}", format_units(*amount), depositor)
            }
        }
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for FanoutSink {
    fn record(&self, event: TreasuryEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}

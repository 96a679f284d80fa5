use crate::error::MultisigError;
use crate::events::{EventSink, LogSink, TreasuryEvent};
use crate::executor::TransferExecutor;
use crate::ledger::{InMemoryLedger, LedgerStore};
use crate::registry::OwnerRegistry;
use crate::transaction::{Transaction, TransactionFilter, TxStatus};
use std::sync::Arc;
use tokio::sync::RwLock;
use treasury_types::{Address, Amount, ExecutionPolicy, TxId};

/// The authorization state machine.
///
/// Every mutating operation holds the ledger write lock for its whole
/// duration, including the executor call, so transitions are serialized and
/// nobody observes a half-applied change. Reads share the lock.
///
/// Each operation works on a copy of the stored record. A transition that
/// pays out is written as executed before the executor runs and rolled back
/// if the transfer fails, so a failed transfer leaves the stored transaction
/// exactly as it was and a failed write never leads to a second payout.
pub struct MultisigEngine {
    registry: OwnerRegistry,
    policy: ExecutionPolicy,
    ledger: RwLock<Box<dyn LedgerStore>>,
    executor: Arc<dyn TransferExecutor>,
    events: Arc<dyn EventSink>,
}

impl MultisigEngine {
    pub fn new(
        registry: OwnerRegistry,
        ledger: Box<dyn LedgerStore>,
        executor: Arc<dyn TransferExecutor>,
    ) -> Self {
        Self {
            registry,
            policy: ExecutionPolicy::default(),
            ledger: RwLock::new(ledger),
            executor,
            events: Arc::new(LogSink),
        }
    }

    /// Engine over a fresh in-memory ledger.
    pub fn in_memory(registry: OwnerRegistry, executor: Arc<dyn TransferExecutor>) -> Self {
        Self::new(registry, Box::new(InMemoryLedger::new()), executor)
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), MultisigError> {
        if self.registry.is_owner(caller) {
            Ok(())
        } else {
            Err(MultisigError::NotOwner { caller: *caller })
        }
    }

    async fn run_transfer(&self, tx: &Transaction) -> Result<(), MultisigError> {
        self.executor
            .transfer(&tx.target, tx.amount, &tx.payload)
            .await
            .map_err(|e| {
                log::warn!("transfer for tx {} failed, state left unchanged: {}", tx.id, e);
                MultisigError::TransferFailed(e)
            })
    }

    /// True when the auto policy applies and `tx` has reached the threshold.
    fn executes_now(&self, tx: &Transaction) -> bool {
        self.policy == ExecutionPolicy::AutoOnThreshold
            && tx.confirmation_count() >= self.registry.threshold()
    }

    /// Puts `before` back after a transfer failed on a record already stored as executed.
    fn restore(&self, ledger: &mut dyn LedgerStore, before: &Transaction) -> Result<(), MultisigError> {
        ledger.update(before).map_err(|e| {
            log::error!(
                "tx {} stays marked executed although its transfer failed: {}",
                before.id,
                e
            );
            MultisigError::from(e)
        })
    }

    /// Proposes a transfer. The submitter's confirmation is recorded with it.
    ///
    /// A submission that executes immediately is stored as executed before
    /// the transfer runs; if the transfer fails the record is retracted and
    /// its id is handed out again.
    pub async fn submit(
        &self,
        caller: Address,
        target: Address,
        amount: Amount,
        payload: Vec<u8>,
    ) -> Result<TxId, MultisigError> {
        self.ensure_owner(&caller)?;

        let mut ledger = self.ledger.write().await;
        let mut tx = Transaction::new(ledger.next_id(), target, amount, payload);
        tx.add_confirmation(caller);
        let executed = self.executes_now(&tx);
        if executed {
            tx.mark_executed();
        }
        let id = ledger.insert(tx.clone())?;

        if executed {
            if let Err(e) = self.run_transfer(&tx).await {
                ledger.retract(id).map_err(|le| {
                    log::error!("tx {} stays marked executed although its transfer failed: {}", id, le);
                    MultisigError::from(le)
                })?;
                return Err(e);
            }
        }

        log::debug!("tx {} recorded for {} by {}", id, target, caller);
        self.events.record(TreasuryEvent::Submission {
            id,
            caller,
            target,
            amount,
        });
        self.events.record(TreasuryEvent::Confirmation { id, owner: caller });
        if executed {
            self.events.record(TreasuryEvent::Execution { id });
        }
        Ok(id)
    }

    /// Adds the caller's confirmation. Under the auto policy the confirmation
    /// that reaches the threshold also executes; if that transfer fails the
    /// confirmation is not kept either.
    pub async fn confirm(&self, caller: Address, id: TxId) -> Result<(), MultisigError> {
        self.ensure_owner(&caller)?;

        let mut ledger = self.ledger.write().await;
        let before = ledger.get(id)?;
        if before.is_executed() {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        let mut tx = before.clone();
        if !tx.add_confirmation(caller) {
            return Err(MultisigError::AlreadyConfirmed { id, owner: caller });
        }
        let executed = self.executes_now(&tx);
        if executed {
            tx.mark_executed();
        }
        ledger.update(&tx)?;

        if executed {
            if let Err(e) = self.run_transfer(&tx).await {
                self.restore(&mut **ledger, &before)?;
                return Err(e);
            }
        }

        log::debug!(
            "tx {} confirmed by {} ({}/{})",
            id,
            caller,
            tx.confirmation_count(),
            self.registry.threshold()
        );
        self.events.record(TreasuryEvent::Confirmation { id, owner: caller });
        if executed {
            self.events.record(TreasuryEvent::Execution { id });
        }
        Ok(())
    }

    /// Withdraws the caller's confirmation from a transaction not yet executed.
    pub async fn revoke(&self, caller: Address, id: TxId) -> Result<(), MultisigError> {
        self.ensure_owner(&caller)?;

        let mut ledger = self.ledger.write().await;
        let mut tx = ledger.get(id)?;
        if tx.is_executed() {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        if !tx.remove_confirmation(&caller) {
            return Err(MultisigError::NotConfirmed { id, owner: caller });
        }
        ledger.update(&tx)?;

        log::debug!("tx {} revoked by {} ({} left)", id, caller, tx.confirmation_count());
        self.events.record(TreasuryEvent::Revocation { id, owner: caller });
        Ok(())
    }

    /// Performs the transfer of an authorized transaction, exactly once.
    ///
    /// The executed flag is stored before the executor runs, so a ledger
    /// failure can only hold a payout back, never repeat it.
    pub async fn execute(&self, id: TxId) -> Result<(), MultisigError> {
        let mut ledger = self.ledger.write().await;
        let before = ledger.get(id)?;
        if before.is_executed() {
            return Err(MultisigError::AlreadyExecuted(id));
        }
        let required = self.registry.threshold();
        let found = before.confirmation_count();
        if found < required {
            return Err(MultisigError::InsufficientConfirmations { id, required, found });
        }

        let mut tx = before.clone();
        tx.mark_executed();
        ledger.update(&tx)?;

        if let Err(e) = self.run_transfer(&tx).await {
            self.restore(&mut **ledger, &before)?;
            return Err(e);
        }

        self.events.record(TreasuryEvent::Execution { id });
        Ok(())
    }

    /// Inbound funding. Anyone may deposit; only outbound movement is gated.
    pub async fn deposit(&self, depositor: Address, amount: Amount) -> Result<(), MultisigError> {
        if amount == 0 {
            return Err(MultisigError::InvalidAmount("deposit must be > 0".to_string()));
        }
        self.executor.deposit(&depositor, amount).await?;
        self.events.record(TreasuryEvent::Deposit { depositor, amount });
        Ok(())
    }

    pub async fn treasury_balance(&self) -> Result<Amount, MultisigError> {
        Ok(self.executor.balance().await?)
    }

    pub async fn get(&self, id: TxId) -> Result<Transaction, MultisigError> {
        Ok(self.ledger.read().await.get(id)?)
    }

    pub async fn count(&self) -> u64 {
        self.ledger.read().await.count()
    }

    pub async fn status(&self, id: TxId) -> Result<TxStatus, MultisigError> {
        Ok(self.get(id).await?.status(self.registry.threshold()))
    }

    pub async fn is_confirmed(&self, id: TxId, owner: &Address) -> Result<bool, MultisigError> {
        Ok(self.get(id).await?.is_confirmed_by(owner))
    }

    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, MultisigError> {
        let threshold = self.registry.threshold();
        let all = self.ledger.read().await.list()?;
        Ok(all
            .into_iter()
            .filter(|tx| filter.matches(tx, threshold))
            .collect())
    }

    /// Transactions that have not executed yet, in id order.
    pub async fn pending(&self) -> Result<Vec<Transaction>, MultisigError> {
        self.list(&TransactionFilter::pending()).await
    }
}

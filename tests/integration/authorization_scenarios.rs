// End-to-end approval flows through the public engine API

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use treasury_multisig::{
    CallHandler, EventLog, ExecutionPolicy, MultisigEngine, MultisigError, OwnerRegistry,
    TransactionFilter, TransferError, TreasuryEvent, TreasuryVault, TxStatus,
};
use treasury_types::{Address, Amount};

const TARGET: u64 = 0xb0b;

fn owner(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn committee(threshold: usize) -> OwnerRegistry {
    OwnerRegistry::new(vec![owner(1), owner(2), owner(3)], threshold).expect("valid committee")
}

/// Payload handler whose verdict can be flipped between calls.
struct ToggleHandler {
    reject: AtomicBool,
}

impl CallHandler for ToggleHandler {
    fn handle(&self, _target: &Address, _amount: Amount, _payload: &[u8]) -> Result<(), TransferError> {
        if self.reject.load(Ordering::SeqCst) {
            Err(TransferError::CallRejected("target reverted".to_string()))
        } else {
            Ok(())
        }
    }
}

struct Setup {
    engine: MultisigEngine,
    vault: Arc<TreasuryVault>,
    events: Arc<EventLog>,
}

fn setup(vault: TreasuryVault, policy: ExecutionPolicy) -> Setup {
    let vault = Arc::new(vault);
    let events = Arc::new(EventLog::new());
    let engine = MultisigEngine::in_memory(committee(2), vault.clone())
        .with_policy(policy)
        .with_event_sink(events.clone());
    Setup { engine, vault, events }
}

#[tokio::test]
async fn test_submit_confirm_execute_then_replay_rejected() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(1_000), ExecutionPolicy::Explicit);

    let id = s.engine.submit(owner(1), owner(TARGET), 100, vec![]).await?;
    let tx = s.engine.get(id).await?;
    assert_eq!(tx.confirmation_count(), 1);
    assert!(!tx.is_executed());

    s.engine.confirm(owner(2), id).await?;
    assert_eq!(s.engine.get(id).await?.confirmation_count(), 2);
    assert_eq!(s.engine.status(id).await?, TxStatus::Authorized);

    s.engine.execute(id).await?;
    assert!(s.engine.get(id).await?.is_executed());
    assert_eq!(s.vault.credited_to(&owner(TARGET)).await, 100);
    assert_eq!(s.engine.treasury_balance().await?, 900);

    let err = s.engine.confirm(owner(3), id).await.unwrap_err();
    assert!(matches!(err, MultisigError::AlreadyExecuted(i) if i == id));
    let err = s.engine.execute(id).await.unwrap_err();
    assert!(matches!(err, MultisigError::AlreadyExecuted(_)));
    assert_eq!(s.vault.history().await.len(), 1);

    let kinds: Vec<_> = s.events.events_for(id);
    assert_eq!(kinds.len(), 4);
    assert!(matches!(kinds[0], TreasuryEvent::Submission { amount: 100, .. }));
    assert_eq!(kinds[3], TreasuryEvent::Execution { id });
    Ok(())
}

#[tokio::test]
async fn test_revoke_drops_below_threshold() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(1_000), ExecutionPolicy::Explicit);

    let id = s.engine.submit(owner(1), owner(TARGET), 100, vec![]).await?;
    s.engine.confirm(owner(2), id).await?;
    s.engine.revoke(owner(2), id).await?;

    let tx = s.engine.get(id).await?;
    assert_eq!(tx.confirmation_count(), 1);
    assert!(!s.engine.is_confirmed(id, &owner(2)).await?);

    let err = s.engine.execute(id).await.unwrap_err();
    assert!(matches!(
        err,
        MultisigError::InsufficientConfirmations { required: 2, found: 1, .. }
    ));

    // A different owner can still complete the approval
    s.engine.confirm(owner(3), id).await?;
    s.engine.execute(id).await?;
    assert_eq!(s.engine.treasury_balance().await?, 900);
    Ok(())
}

#[tokio::test]
async fn test_revocation_event_and_silent_rejections() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(1_000), ExecutionPolicy::Explicit);

    let id = s.engine.submit(owner(1), owner(TARGET), 100, vec![]).await?;
    s.engine.confirm(owner(2), id).await?;
    s.engine.revoke(owner(2), id).await?;
    assert_eq!(
        s.events.events_for(id).last(),
        Some(&TreasuryEvent::Revocation { id, owner: owner(2) })
    );
    let recorded = s.events.len();

    let err = s.engine.confirm(owner(1), id).await.unwrap_err();
    assert!(matches!(err, MultisigError::AlreadyConfirmed { .. }));
    let err = s.engine.revoke(owner(3), id).await.unwrap_err();
    assert!(matches!(err, MultisigError::NotConfirmed { .. }));
    let err = s.engine.revoke(owner(99), id).await.unwrap_err();
    assert!(matches!(err, MultisigError::NotOwner { .. }));
    let err = s.engine.execute(id).await.unwrap_err();
    assert!(matches!(err, MultisigError::InsufficientConfirmations { .. }));
    assert_eq!(s.events.len(), recorded);

    let sequences: Vec<_> = s.events.records().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, (0..recorded as u64).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn test_failed_transfer_leaves_transaction_executable() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(50), ExecutionPolicy::Explicit);

    let id = s.engine.submit(owner(1), owner(TARGET), 100, vec![]).await?;
    s.engine.confirm(owner(2), id).await?;

    let err = s.engine.execute(id).await.unwrap_err();
    assert!(matches!(
        err,
        MultisigError::TransferFailed(TransferError::InsufficientFunds { requested: 100, available: 50 })
    ));

    let tx = s.engine.get(id).await?;
    assert!(!tx.is_executed());
    assert_eq!(tx.confirmation_count(), 2);
    assert_eq!(s.engine.treasury_balance().await?, 50);
    assert!(s.events.events_for(id).iter().all(|e| !matches!(e, TreasuryEvent::Execution { .. })));

    s.engine.deposit(owner(77), 50).await?;
    s.engine.execute(id).await?;
    assert!(s.engine.get(id).await?.is_executed());
    assert_eq!(s.engine.treasury_balance().await?, 0);
    assert_eq!(s.vault.deposited_by(&owner(77)).await, 50);
    Ok(())
}

#[tokio::test]
async fn test_rejected_call_is_retriable_under_auto_policy() -> Result<()> {
    let handler = Arc::new(ToggleHandler {
        reject: AtomicBool::new(true),
    });
    let vault = TreasuryVault::with_balance(1_000).with_call_handler(handler.clone());
    let s = setup(vault, ExecutionPolicy::AutoOnThreshold);

    let id = s.engine.submit(owner(1), owner(TARGET), 10, vec![0xde, 0xad]).await?;

    let err = s.engine.confirm(owner(2), id).await.unwrap_err();
    assert!(matches!(err, MultisigError::TransferFailed(TransferError::CallRejected(_))));
    let tx = s.engine.get(id).await?;
    assert_eq!(tx.confirmation_count(), 1);
    assert!(!tx.is_confirmed_by(&owner(2)));
    assert_eq!(s.engine.treasury_balance().await?, 1_000);

    handler.reject.store(false, Ordering::SeqCst);
    s.engine.confirm(owner(2), id).await?;
    let tx = s.engine.get(id).await?;
    assert!(tx.is_executed());
    assert_eq!(tx.confirmation_count(), 2);

    let history = s.vault.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].payload, vec![0xde, 0xad]);
    Ok(())
}

#[test]
fn test_invalid_committees_are_rejected() {
    let err = OwnerRegistry::new(vec![owner(1), owner(2)], 2).unwrap_err();
    assert!(matches!(err, MultisigError::InvalidOwnerSet(_)));

    let err = OwnerRegistry::new(vec![owner(1), owner(2), owner(3)], 4).unwrap_err();
    assert!(matches!(
        err,
        MultisigError::InvalidThreshold { threshold: 4, owners: 3 }
    ));

    let err = OwnerRegistry::new(vec![owner(1), owner(2), owner(2)], 2).unwrap_err();
    assert!(matches!(err, MultisigError::InvalidOwnerSet(_)));
}

#[tokio::test]
async fn test_count_always_matches_flags() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(1_000), ExecutionPolicy::Explicit);
    let owners = s.engine.owners().to_vec();
    let id = s.engine.submit(owner(1), owner(TARGET), 1, vec![]).await?;

    let check = |tx: &treasury_multisig::Transaction| {
        let flagged = tx
            .confirmation_flags(&owners)
            .iter()
            .filter(|(_, confirmed)| *confirmed)
            .count();
        assert_eq!(flagged, tx.confirmation_count());
    };

    check(&s.engine.get(id).await?);
    s.engine.confirm(owner(3), id).await?;
    check(&s.engine.get(id).await?);
    let _ = s.engine.confirm(owner(3), id).await;
    check(&s.engine.get(id).await?);
    s.engine.revoke(owner(1), id).await?;
    check(&s.engine.get(id).await?);
    let _ = s.engine.revoke(owner(1), id).await;
    check(&s.engine.get(id).await?);
    let _ = s.engine.confirm(owner(99), id).await;
    check(&s.engine.get(id).await?);
    assert_eq!(s.engine.get(id).await?.confirmation_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_list_filters_by_status() -> Result<()> {
    let s = setup(TreasuryVault::with_balance(1_000), ExecutionPolicy::Explicit);

    let a = s.engine.submit(owner(1), owner(TARGET), 1, vec![]).await?;
    let b = s.engine.submit(owner(2), owner(TARGET + 1), 2, vec![]).await?;
    let c = s.engine.submit(owner(3), owner(TARGET), 3, vec![]).await?;
    s.engine.confirm(owner(1), b).await?;
    s.engine.confirm(owner(1), c).await?;
    s.engine.execute(c).await?;

    let ids = |txs: Vec<treasury_multisig::Transaction>| txs.into_iter().map(|t| t.id).collect::<Vec<_>>();
    assert_eq!(ids(s.engine.list(&TransactionFilter::with_status(TxStatus::Proposed)).await?), vec![a]);
    assert_eq!(ids(s.engine.list(&TransactionFilter::with_status(TxStatus::Authorized)).await?), vec![b]);
    assert_eq!(ids(s.engine.list(&TransactionFilter::with_status(TxStatus::Executed)).await?), vec![c]);
    assert_eq!(ids(s.engine.pending().await?), vec![a, b]);

    let to_target = TransactionFilter {
        target: Some(owner(TARGET)),
        ..Default::default()
    };
    assert_eq!(ids(s.engine.list(&to_target).await?), vec![a, c]);
    assert_eq!(s.engine.count().await, 3);
    Ok(())
}

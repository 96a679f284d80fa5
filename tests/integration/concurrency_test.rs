// Racing owners against one transaction never produce a second transfer

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;
use treasury_multisig::{
    ExecutionPolicy, MultisigEngine, MultisigError, OwnerRegistry, TreasuryVault,
};
use treasury_types::Address;

fn committee(n: u64, threshold: usize) -> OwnerRegistry {
    let owners = (1..=n).map(Address::from_low_u64).collect();
    OwnerRegistry::new(owners, threshold).expect("valid committee")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_execute_pays_once() -> Result<()> {
    let vault = Arc::new(TreasuryVault::with_balance(1_000));
    let engine = Arc::new(MultisigEngine::in_memory(committee(5, 3), vault.clone()));
    let target = Address::from_low_u64(0xb0b);

    let id = engine.submit(Address::from_low_u64(1), target, 400, vec![]).await?;
    engine.confirm(Address::from_low_u64(2), id).await?;
    engine.confirm(Address::from_low_u64(3), id).await?;

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let engine = engine.clone();
        tasks.spawn(async move { engine.execute(id).await });
    }

    let mut executed = 0;
    let mut replays = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(()) => executed += 1,
            Err(MultisigError::AlreadyExecuted(_)) => replays += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(executed, 1);
    assert_eq!(replays, 15);
    assert_eq!(vault.credited_to(&target).await, 400);
    assert_eq!(engine.treasury_balance().await?, 600);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_confirms_under_auto_policy() -> Result<()> {
    let vault = Arc::new(TreasuryVault::with_balance(1_000));
    let engine = Arc::new(
        MultisigEngine::in_memory(committee(9, 5), vault.clone())
            .with_policy(ExecutionPolicy::AutoOnThreshold),
    );
    let target = Address::from_low_u64(0xb0b);
    let id = engine.submit(Address::from_low_u64(1), target, 10, vec![]).await?;

    let mut tasks = JoinSet::new();
    for n in 2..=9 {
        let engine = engine.clone();
        tasks.spawn(async move { engine.confirm(Address::from_low_u64(n), id).await });
    }

    let mut accepted = 0;
    let mut late = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(()) => accepted += 1,
            Err(MultisigError::AlreadyExecuted(_)) => late += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // The submitter plus four confirmations reach the threshold of five
    assert_eq!(accepted, 4);
    assert_eq!(late, 4);
    let tx = engine.get(id).await?;
    assert!(tx.is_executed());
    assert_eq!(tx.confirmation_count(), 5);
    assert_eq!(vault.history().await.len(), 1);
    Ok(())
}

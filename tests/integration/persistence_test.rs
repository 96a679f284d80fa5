// A treasury backed by sled survives a restart with its approvals intact

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use treasury_config::parse_treasury_config;
use treasury_multisig::{
    EventLog, ExecutionPolicy, MultisigEngine, MultisigError, OwnerRegistry, SledLedger, SledVault,
    TxStatus,
};
use treasury_types::{parse_units, Address};

const CONFIG: &str = r#"
name = "grants"
owners = [
    "0x00000000000000000000000000000000000000a1",
    "0x00000000000000000000000000000000000000a2",
    "0x00000000000000000000000000000000000000a3",
]
threshold = 2

[execution]
policy = "explicit"

[storage]
path = "grants_data"
"#;

fn open_engine(config_path: &Path) -> Result<MultisigEngine> {
    let config = parse_treasury_config(CONFIG)?;
    let registry = OwnerRegistry::from_hex(&config.owners, config.threshold)?;
    let db = sled::open(config.storage_path_relative_to(config_path))?;
    let ledger = SledLedger::from_db(&db)?;
    let vault = SledVault::from_db(&db)?;
    Ok(MultisigEngine::new(registry, Box::new(ledger), Arc::new(vault))
        .with_policy(config.execution.policy)
        .with_event_sink(Arc::new(EventLog::new())))
}

#[tokio::test]
async fn test_state_survives_reopen() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("treasury.toml");

    let a1: Address = "0x00000000000000000000000000000000000000a1".parse()?;
    let a2: Address = "0x00000000000000000000000000000000000000a2".parse()?;
    let a3: Address = "0x00000000000000000000000000000000000000a3".parse()?;
    let target = Address::from_low_u64(0xb0b);
    let amount = parse_units("1.25")?;

    let (paid, pending) = {
        let engine = open_engine(&config_path)?;
        assert_eq!(engine.policy(), ExecutionPolicy::Explicit);
        engine.deposit(Address::from_low_u64(7), parse_units("3")?).await?;

        let paid = engine.submit(a1, target, amount, vec![]).await?;
        engine.confirm(a3, paid).await?;
        engine.execute(paid).await?;

        let pending = engine.submit(a2, target, amount, vec![]).await?;
        (paid, pending)
    };
    assert!(temp_dir.path().join("grants_data").exists());

    let engine = open_engine(&config_path)?;
    assert_eq!(engine.count().await, 2);
    assert_eq!(engine.status(paid).await?, TxStatus::Executed);
    assert_eq!(engine.status(pending).await?, TxStatus::Proposed);
    assert!(engine.is_confirmed(pending, &a2).await?);
    assert_eq!(engine.treasury_balance().await?, parse_units("1.75")?);

    // Replay protection holds across the restart
    let err = engine.execute(paid).await.unwrap_err();
    assert!(matches!(err, MultisigError::AlreadyExecuted(_)));

    // Ids continue from the persisted sequence
    let next = engine.submit(a3, target, 1, vec![]).await?;
    assert_eq!(next, 2);

    engine.confirm(a1, pending).await?;
    engine.execute(pending).await?;
    assert_eq!(engine.treasury_balance().await?, parse_units("0.5")?);
    Ok(())
}

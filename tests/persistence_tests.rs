mod common;

use std::fs;

use common::{file_store, open_file_store, sample_goal};
use goal_savings::{
    core::services::LedgerService,
    storage::{JsonFileStore, SnapshotStore, GOALS_KEY, LEDGER_KEY},
    SavingsError,
};

#[test]
fn goals_and_ledger_survive_a_restart() {
    let (mut store, dir) = file_store();
    store.load().unwrap();
    let goal = store.create_goal(sample_goal("Kitchen", 4000.0)).unwrap();
    store.apply_credit(goal.id, 250.0, "Mobile Wallet").unwrap();
    store.apply_debit(goal.id, 40.0, Some("Tiles")).unwrap();

    let mut reopened = open_file_store(&dir);
    let report = reopened.load().unwrap();
    assert!(!report.used_defaults);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.goals, 4);
    assert_eq!(report.transactions, 6);

    let restored = reopened.goal(goal.id).unwrap();
    assert_eq!(restored.current(), 210.0);
    assert_eq!(restored.progress(), 5);
    let history = reopened.transactions_for(goal.id);
    assert_eq!(history[0].amount, -40.0);
    assert_eq!(history[1].payment_method.as_deref(), Some("Mobile Wallet"));
}

#[test]
fn snapshot_dates_are_iso_strings() {
    let (mut store, dir) = file_store();
    store.create_goal(sample_goal("Dates", 100.0)).unwrap();
    let raw = fs::read_to_string(dir.join("savings-goals.json")).unwrap();
    assert!(raw.contains("\"deadline\": \"2026-09-15\""), "{raw}");
}

#[test]
fn malformed_snapshot_falls_back_to_defaults() {
    let dir = common::temp_dir();
    let snapshots = JsonFileStore::new(dir.clone()).unwrap();
    snapshots.write(GOALS_KEY, "[{\"name\": ").unwrap();

    let mut store = open_file_store(&dir);
    let report = store.load().unwrap();
    assert!(report.used_defaults);
    assert_eq!(report.warnings.len(), 1);
    let names: Vec<_> = store.goals().iter().map(|goal| goal.name.as_str()).collect();
    assert_eq!(names, vec!["Emergency Fund", "Dream Vacation", "New Car"]);
}

#[test]
fn ledger_mismatch_is_reconciled_on_load() {
    let (mut store, dir) = file_store();
    let goal = store.create_goal(sample_goal("Drift", 1000.0)).unwrap();
    store.apply_credit(goal.id, 100.0, "").unwrap();

    // Drop the ledger behind the store's back.
    let snapshots = JsonFileStore::new(dir.clone()).unwrap();
    snapshots.write(LEDGER_KEY, "[]").unwrap();

    let mut reopened = open_file_store(&dir);
    let report = reopened.load().unwrap();
    assert_eq!(report.warnings.len(), 1);
    let restored = reopened.goal(goal.id).unwrap();
    assert_eq!(restored.current(), 100.0);
    assert_eq!(restored.seed_balance, 100.0);
    assert_eq!(
        LedgerService::replay(restored.seed_balance, reopened.transactions_for(goal.id)),
        restored.current()
    );
}

#[test]
fn orphaned_transactions_are_dropped() {
    let (mut store, dir) = file_store();
    let keep = store.create_goal(sample_goal("Keep", 100.0)).unwrap();
    let gone = store.create_goal(sample_goal("Gone", 100.0)).unwrap();
    store.apply_credit(keep.id, 10.0, "").unwrap();
    store.apply_credit(gone.id, 20.0, "").unwrap();

    let snapshots = JsonFileStore::new(dir.clone()).unwrap();
    let goals = snapshots.read(GOALS_KEY).unwrap().unwrap();
    let mut parsed: Vec<serde_json::Value> = serde_json::from_str(&goals).unwrap();
    parsed.retain(|goal| goal["name"] != "Gone");
    snapshots
        .write(GOALS_KEY, &serde_json::to_string(&parsed).unwrap())
        .unwrap();

    let mut reopened = open_file_store(&dir);
    let report = reopened.load().unwrap();
    assert_eq!(report.transactions, 1);
    assert!(report.warnings[0].contains("unknown goals"));
}

#[test]
fn failed_write_keeps_previous_snapshot_and_state() {
    let (mut store, dir) = file_store();
    let goal = store.create_goal(sample_goal("Locked", 100.0)).unwrap();
    let before = fs::read_to_string(dir.join("savings-goals.json")).unwrap();

    // A directory where the temp file should go makes the write fail.
    fs::create_dir_all(dir.join("savings-ledger.json.tmp")).unwrap();
    let err = store.apply_credit(goal.id, 10.0, "").unwrap_err();
    assert!(matches!(err, SavingsError::PersistenceUnavailable(_)));

    assert_eq!(store.goal(goal.id).unwrap().current(), 0.0);
    assert!(store.transactions().is_empty());
    let after = fs::read_to_string(dir.join("savings-goals.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn failed_goal_write_rolls_the_ledger_back() {
    let (mut store, dir) = file_store();
    let goal = store.create_goal(sample_goal("Rollback", 500.0)).unwrap();
    store.apply_credit(goal.id, 10.0, "").unwrap();

    fs::create_dir_all(dir.join("savings-goals.json.tmp")).unwrap();
    let err = store.apply_credit(goal.id, 20.0, "").unwrap_err();
    assert!(matches!(err, SavingsError::PersistenceUnavailable(_)));
    assert_eq!(store.goal(goal.id).unwrap().current(), 10.0);
    fs::remove_dir(dir.join("savings-goals.json.tmp")).unwrap();

    let mut reopened = open_file_store(&dir);
    let report = reopened.load().unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let restored = reopened.goal(goal.id).unwrap();
    assert_eq!(restored.current(), 10.0);
    assert_eq!(restored.seed_balance, 0.0);
    assert_eq!(reopened.transactions_for(goal.id).len(), 1);
}

#[test]
fn undecodable_goal_bytes_fall_back_to_defaults() {
    let dir = common::temp_dir();
    fs::write(dir.join("savings-goals.json"), [0xff, 0xfe, b'[', b']']).unwrap();

    let mut store = open_file_store(&dir);
    let report = store.load().unwrap();
    assert!(report.used_defaults);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("malformed"), "{:?}", report.warnings);
    assert_eq!(store.goals().len(), 3);
    assert_eq!(store.total_saved(), 13850.0);
}

#[test]
fn stored_goal_with_negative_balance_is_dropped() {
    let (mut store, dir) = file_store();
    let good = store.create_goal(sample_goal("Good", 300.0)).unwrap();
    store.create_goal(sample_goal("Broken", 300.0)).unwrap();

    let snapshots = JsonFileStore::new(dir.clone()).unwrap();
    let goals = snapshots.read(GOALS_KEY).unwrap().unwrap();
    let mut parsed: Vec<serde_json::Value> = serde_json::from_str(&goals).unwrap();
    for goal in parsed.iter_mut().filter(|goal| goal["name"] == "Broken") {
        goal["current"] = serde_json::json!(-50.0);
        goal["seed_balance"] = serde_json::json!(-50.0);
    }
    snapshots
        .write(GOALS_KEY, &serde_json::to_string(&parsed).unwrap())
        .unwrap();

    let mut reopened = open_file_store(&dir);
    let report = reopened.load().unwrap();
    assert!(!report.used_defaults);
    assert_eq!(report.goals, 1);
    assert!(report.warnings[0].contains("Broken"), "{:?}", report.warnings);

    reopened.apply_credit(good.id, 25.0, "").unwrap();
    let restored = reopened.goal(good.id).unwrap();
    assert_eq!(
        LedgerService::replay(restored.seed_balance, reopened.transactions_for(good.id)),
        restored.current()
    );
}

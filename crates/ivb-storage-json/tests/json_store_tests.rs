use std::fs;

use ivb_core::{BudgetTracker, KeyValueStore};
use ivb_domain::{TransactionDraft, UnitMode};
use ivb_storage_json::JsonFileStore;
use tempfile::tempdir;

#[test]
fn json_store_saves_loads_and_clears() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().to_path_buf()).expect("create store");

    assert_eq!(store.load("state").expect("load"), None);
    store.save("state", r#"{"monthlyCapYen":1}"#).expect("save");

    let path = store.path_for("state");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(path.exists());
    let loaded = store.load("state").expect("load").expect("present");
    let parsed: serde_json::Value = serde_json::from_str(&loaded).expect("json");
    assert_eq!(parsed["monthlyCapYen"], 1);

    store.clear("state").expect("clear");
    assert!(!path.exists());
    store.clear("state").expect("clearing twice is fine");
}

#[test]
fn overwriting_keeps_a_backup_of_the_previous_value() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().to_path_buf()).expect("create store");

    store.save("state", r#"{"v":1}"#).expect("first save");
    assert!(store.list_backups("state").expect("list").is_empty());

    store.save("state", r#"{"v":2}"#).expect("second save");
    let backups = store.list_backups("state").expect("list");
    assert_eq!(backups.len(), 1);
    let previous = store.read_backup(&backups[0]).expect("read backup");
    assert!(previous.contains("\"v\": 1"));
    assert!(backups[0].path.starts_with(dir.path().join("backups")));
    assert!(store.list_backups("other").expect("list").is_empty());
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::with_retention(dir.path().to_path_buf(), 2).expect("create store");
    let backups_dir = dir.path().join("backups");
    for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
        fs::write(backups_dir.join(format!("state_{stamp}.json")), "{}").expect("seed backup");
    }

    store.save("state", "{}").expect("save");
    store.save("state", "{}").expect("overwrite");

    let backups = store.list_backups("state").expect("list");
    assert_eq!(backups.len(), 2);
    assert!(backups[0].created_at >= backups[1].created_at);
    assert!(!backups_dir.join("state_20240101_000000.json").exists());
}

#[test]
fn tracker_state_survives_restart_on_disk() {
    let dir = tempdir().expect("tempdir");
    {
        let store = JsonFileStore::new(dir.path().to_path_buf()).expect("create store");
        let mut tracker = BudgetTracker::new(Box::new(store));
        tracker
            .add_transaction(TransactionDraft::new("2024-03-01", "NASDAQ", 10_000.0))
            .expect("add");
        tracker.set_unit_mode(UnitMode::Major);
        tracker.rename_category(0, "NDX").expect("rename");
        assert!(tracker.is_persistent());
    }

    let store = JsonFileStore::new(dir.path().to_path_buf()).expect("reopen store");
    let tracker = BudgetTracker::new(Box::new(store));
    assert_eq!(tracker.unit_mode(), UnitMode::Major);
    assert_eq!(tracker.transactions().len(), 1);
    assert_eq!(tracker.transactions()[0].category_key, "NDX");
    assert_eq!(tracker.budgets()[0].key, "NDX");
    assert!(dir.path().join("invest_tracker_state_v2.json").exists());
    assert!(dir.path().join("invest_tracker_budgets_v1.json").exists());
}

#[test]
fn corrupted_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("invest_tracker_state_v2.json"), "{broken").expect("seed");
    let store = JsonFileStore::new(dir.path().to_path_buf()).expect("create store");
    let tracker = BudgetTracker::new(Box::new(store));
    assert!(tracker.transactions().is_empty());
    assert_eq!(tracker.state().monthly_cap_yen, 200_000);
}

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use ivb_domain::{AppState, BudgetCategory, Transaction, UnitMode};
use serde::Serialize;
use serde_json::Value;

use crate::{catalog::CatalogService, reconciler::StateReconciler, CoreError};

/// Key holding the application state blob (cap, unit mode, ledger).
pub const STATE_KEY: &str = "invest_tracker_state_v2";
/// Key holding the separately stored budget catalog.
pub const BUDGETS_KEY: &str = "invest_tracker_budgets_v1";

/// Abstraction over persistence backends addressed by a single string key.
///
/// Implementations report read/write failures as
/// [`CoreError::StorageUnavailable`]. A missing key is `Ok(None)`, not an error.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn clear(&self, key: &str) -> Result<(), CoreError>;
}

/// In-process store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        apply: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, CoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CoreError::StorageUnavailable("memory store lock poisoned".into()))?;
        Ok(apply(&mut guard))
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredState<'a> {
    monthly_cap_yen: i64,
    unit_mode: UnitMode,
    txs: &'a [Transaction],
}

/// Loads and saves the state blob and the budget catalog over a
/// [`KeyValueStore`].
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted state, or `fallback` when nothing usable is stored.
    ///
    /// Malformed blobs are treated as absent. The separately stored catalog
    /// wins over any catalog embedded in the blob.
    pub fn load_state_or(&self, fallback: AppState) -> Result<AppState, CoreError> {
        let mut state = match self.store.load(STATE_KEY)? {
            Some(text) => StateReconciler::load_persisted_state(&text, &fallback)
                .unwrap_or_else(|| {
                    tracing::warn!(key = STATE_KEY, "stored state is malformed; using defaults");
                    fallback
                }),
            None => fallback,
        };
        if let Some(budgets) = self.load_budgets()? {
            state.budgets = budgets;
        }
        Ok(state)
    }

    /// Persists the state blob and the catalog under their own keys.
    pub fn save_state(&self, state: &AppState) -> Result<(), CoreError> {
        let stored = StoredState {
            monthly_cap_yen: state.monthly_cap_yen,
            unit_mode: state.unit_mode,
            txs: &state.txs,
        };
        let json = serde_json::to_string(&stored)?;
        self.store.save(STATE_KEY, &json)?;
        self.save_budgets(&state.budgets)?;
        Ok(())
    }

    pub fn clear_state(&self) -> Result<(), CoreError> {
        self.store.clear(STATE_KEY)
    }

    /// Loads the stored catalog, normalized. Absent or malformed → `None`.
    pub fn load_budgets(&self) -> Result<Option<Vec<BudgetCategory>>, CoreError> {
        let Some(text) = self.store.load(BUDGETS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => Ok(Some(CatalogService::normalize(&raw))),
            Err(err) => {
                tracing::warn!(key = BUDGETS_KEY, error = %err, "stored budgets are malformed; ignoring");
                Ok(None)
            }
        }
    }

    /// Normalizes and stores the catalog, returning what was written.
    pub fn save_budgets(&self, budgets: &[BudgetCategory]) -> Result<Vec<BudgetCategory>, CoreError> {
        let list = CatalogService::normalize_list(budgets.to_vec());
        let json = serde_json::to_string(&list)?;
        self.store.save(BUDGETS_KEY, &json)?;
        Ok(list)
    }

    pub fn clear_budgets(&self) -> Result<(), CoreError> {
        self.store.clear(BUDGETS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ivb_domain::default_budgets;

    fn gateway_with(store: &MemoryStore) -> PersistenceGateway {
        PersistenceGateway::new(Box::new(store.clone()))
    }

    #[test]
    fn first_run_returns_fallback() {
        let store = MemoryStore::new();
        let state = gateway_with(&store)
            .load_state_or(AppState::default())
            .unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let mut state = AppState::default();
        state.monthly_cap_yen = 150_000;
        state.unit_mode = UnitMode::Major;
        state.txs.push(Transaction::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "NASDAQ",
            10_000,
        ));
        state.budgets = vec![BudgetCategory::new("A", "Alpha", 2.0)];
        gateway.save_state(&state).unwrap();

        let blob = store.load(STATE_KEY).unwrap().unwrap();
        assert!(!blob.contains("budgets"), "catalog lives under its own key");

        let loaded = gateway.load_state_or(AppState::default()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn malformed_blob_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.save(STATE_KEY, "{not json").unwrap();
        store.save(BUDGETS_KEY, "[[[").unwrap();
        let state = gateway_with(&store)
            .load_state_or(AppState::default())
            .unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn stored_budgets_are_normalized_on_load() {
        let store = MemoryStore::new();
        store
            .save(BUDGETS_KEY, r#"[{"key":"A","monthlyMan":-3},{"key":"A"}]"#)
            .unwrap();
        let budgets = gateway_with(&store).load_budgets().unwrap().unwrap();
        assert_eq!(budgets, vec![BudgetCategory::new("A", "A", 0.0)]);
    }

    #[test]
    fn save_budgets_never_writes_empty_catalog() {
        let store = MemoryStore::new();
        let written = gateway_with(&store).save_budgets(&[]).unwrap();
        assert_eq!(written, default_budgets());
    }

    #[test]
    fn clear_removes_both_keys() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        gateway.save_state(&AppState::default()).unwrap();
        gateway.clear_state().unwrap();
        gateway.clear_budgets().unwrap();
        assert_eq!(store.load(STATE_KEY).unwrap(), None);
        assert_eq!(store.load(BUDGETS_KEY).unwrap(), None);
    }
}

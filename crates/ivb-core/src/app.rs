//! Application controller: the single owner of live state.
//!
//! Frontends hold a [`BudgetTracker`] and call into it for every user action.
//! Each mutating call validates first, applies the change, then persists.

use chrono::NaiveDate;
use ivb_domain::{
    AppState, BudgetCategory, MonthSummary, MonthToken, Transaction, TransactionDraft, UnitMode,
    MAX_AMOUNT_YEN,
};

use crate::{
    aggregator::compute_month,
    catalog::CatalogService,
    ledger::TransactionService,
    reconciler::{ImportReport, StateReconciler},
    storage::{KeyValueStore, PersistenceGateway},
    CoreError, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persistence {
    Active,
    /// A read or write failed; the session continues in memory only.
    Degraded,
}

pub struct BudgetTracker {
    state: AppState,
    gateway: PersistenceGateway,
    persistence: Persistence,
    pending_warning: Option<CoreError>,
}

impl BudgetTracker {
    /// Opens the tracker over `store`, starting from the built-in defaults on
    /// first run.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::open(store, AppState::default())
    }

    /// Opens the tracker over `store`, starting from `fallback` when nothing
    /// usable is stored. A failing store degrades to in-memory operation.
    pub fn open(store: Box<dyn KeyValueStore>, fallback: AppState) -> Self {
        let gateway = PersistenceGateway::new(store);
        let mut tracker = Self {
            state: fallback.clone(),
            gateway,
            persistence: Persistence::Active,
            pending_warning: None,
        };
        match tracker.gateway.load_state_or(fallback) {
            Ok(state) => {
                tracing::debug!(
                    transactions = state.txs.len(),
                    categories = state.budgets.len(),
                    "loaded tracker state"
                );
                tracker.state = state;
            }
            Err(err) => tracker.degrade(err),
        }
        tracker
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn budgets(&self) -> &[BudgetCategory] {
        &self.state.budgets
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.txs
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.state.unit_mode
    }

    /// Returns `false` once a storage failure has switched the session to
    /// in-memory operation.
    pub fn is_persistent(&self) -> bool {
        self.persistence == Persistence::Active
    }

    /// Yields the storage failure that degraded the session, once.
    pub fn take_storage_warning(&mut self) -> Option<CoreError> {
        self.pending_warning.take()
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, CoreError> {
        let stored = TransactionService::add(&mut self.state.txs, draft)?;
        tracing::debug!(id = %stored.id, category = %stored.category_key, amount = stored.amount_yen, "transaction added");
        self.persist();
        Ok(stored)
    }

    pub fn remove_transaction(&mut self, id: &str) -> bool {
        let removed = TransactionService::remove(&mut self.state.txs, id);
        if removed {
            tracing::debug!(id, "transaction removed");
            self.persist();
        }
        removed
    }

    pub fn set_monthly_cap(&mut self, cap_yen: i64) -> Result<(), CoreError> {
        if !(0..=MAX_AMOUNT_YEN).contains(&cap_yen) {
            return Err(ValidationError::InvalidCap.into());
        }
        self.state.monthly_cap_yen = cap_yen;
        self.persist();
        Ok(())
    }

    pub fn set_unit_mode(&mut self, mode: UnitMode) {
        self.state.unit_mode = mode;
        self.persist();
    }

    pub fn add_category(
        &mut self,
        key: Option<&str>,
        name: Option<&str>,
        monthly_man: Option<f64>,
    ) -> Result<BudgetCategory, CoreError> {
        let added = CatalogService::add_category(&mut self.state.budgets, key, name, monthly_man)?;
        tracing::debug!(key = %added.key, "category added");
        self.persist();
        Ok(added)
    }

    /// Changes a category key and moves every transaction booked against the
    /// old key onto the new one. Returns the number of transactions moved.
    pub fn rename_category(&mut self, index: usize, new_key: &str) -> Result<usize, CoreError> {
        let old_key = CatalogService::rename_key(&mut self.state.budgets, index, new_key)?;
        let new_key = self.state.budgets[index].key.clone();
        let moved = TransactionService::remap_category(&mut self.state.txs, &old_key, &new_key);
        tracing::debug!(%old_key, %new_key, moved, "category key renamed");
        self.persist();
        Ok(moved)
    }

    pub fn rename_category_label(&mut self, index: usize, name: &str) -> Result<(), CoreError> {
        CatalogService::rename_display(&mut self.state.budgets, index, name)?;
        self.persist();
        Ok(())
    }

    pub fn update_category_cap(&mut self, index: usize, monthly_man: f64) -> Result<(), CoreError> {
        CatalogService::update_cap(&mut self.state.budgets, index, monthly_man)?;
        self.persist();
        Ok(())
    }

    /// Removes a category. Its transactions stay in the ledger untouched.
    pub fn remove_category(&mut self, index: usize) -> Result<BudgetCategory, CoreError> {
        let removed = CatalogService::remove_category(&mut self.state.budgets, index)?;
        tracing::debug!(key = %removed.key, "category removed");
        self.persist();
        Ok(removed)
    }

    pub fn reset_categories(&mut self) {
        self.state.budgets = CatalogService::reset_to_default();
        tracing::info!("budget catalog reset to defaults");
        self.persist();
    }

    pub fn export_snapshot(&self) -> Result<String, CoreError> {
        StateReconciler::export_snapshot(&self.state)
    }

    /// Replaces the state with an exported snapshot. On failure the current
    /// state is left untouched.
    pub fn import_snapshot(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let (state, report) = StateReconciler::import_snapshot(text, &self.state)?;
        self.state = state;
        tracing::info!(
            imported = report.imported,
            dropped = report.dropped,
            categories = report.categories,
            "snapshot imported"
        );
        self.persist();
        Ok(report)
    }

    pub fn compute_month(&self, month: &MonthToken) -> MonthSummary {
        compute_month(
            &self.state.txs,
            &self.state.budgets,
            month,
            self.state.monthly_cap_yen,
        )
    }

    /// Wipes stored data and returns to the built-in defaults.
    pub fn clear_all(&mut self) {
        self.state = AppState::default();
        if self.persistence == Persistence::Active {
            let cleared = self
                .gateway
                .clear_state()
                .and_then(|_| self.gateway.clear_budgets());
            if let Err(err) = cleared {
                self.degrade(err);
            }
        }
        tracing::info!("tracker data cleared");
    }

    /// Suggested file name for an export taken on `date`.
    pub fn export_file_name(date: NaiveDate) -> String {
        format!("invest_backup_{}.json", date.format("%Y-%m-%d"))
    }

    fn persist(&mut self) {
        if self.persistence == Persistence::Degraded {
            return;
        }
        if let Err(err) = self.gateway.save_state(&self.state) {
            self.degrade(err);
        }
    }

    fn degrade(&mut self, err: CoreError) {
        tracing::warn!(error = %err, "storage unavailable; continuing in memory only");
        self.persistence = Persistence::Degraded;
        self.pending_warning = Some(err);
    }
}

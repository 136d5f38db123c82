//! Turns externally supplied snapshots into valid application state.

use ivb_domain::{AppState, UnitMode, MAX_AMOUNT_YEN};
use serde_json::Value;

use crate::{catalog::CatalogService, coerce, ledger::TransactionService, CoreError};

/// Field names under which a catalog may appear in a snapshot. The first is
/// the co-located layout, the second the legacy separately-exported layout.
const BUDGET_FIELDS: [&str; 2] = ["budgets", "budgetCatalog"];

/// Outcome counters for a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub dropped: usize,
    pub categories: usize,
}

pub struct StateReconciler;

impl StateReconciler {
    /// Normalizes a parsed snapshot against the `current` state.
    ///
    /// Fails only when `raw` is not an object or has no `txs` array. Finer
    /// defects degrade: an unusable cap keeps the current cap, unknown unit
    /// tokens read as minor units, a missing catalog keeps the current one and
    /// invalid transactions are dropped.
    pub fn normalize_imported_state(raw: &Value, current: &AppState) -> Result<AppState, CoreError> {
        let object = raw
            .as_object()
            .ok_or_else(|| CoreError::MalformedPayload("snapshot is not a JSON object".into()))?;
        let txs = object
            .get("txs")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::MalformedPayload("snapshot has no `txs` list".into()))?;

        let monthly_cap_yen = coerce::number_field(raw, "monthlyCapYen")
            .filter(|cap| cap.is_finite() && *cap >= 0.0 && *cap <= MAX_AMOUNT_YEN as f64)
            .map(|cap| cap.round() as i64)
            .unwrap_or(current.monthly_cap_yen);

        let unit_mode = match object.get("unitMode") {
            Some(Value::String(token)) => UnitMode::from_token(token),
            _ => UnitMode::Minor,
        };

        let budgets = BUDGET_FIELDS
            .iter()
            .find_map(|field| object.get(*field).filter(|value| !value.is_null()))
            .map(CatalogService::normalize)
            .unwrap_or_else(|| current.budgets.clone());

        Ok(AppState {
            monthly_cap_yen,
            unit_mode,
            txs: TransactionService::import_replace(txs),
            budgets,
        })
    }

    /// Parses and normalizes an exported snapshot.
    pub fn import_snapshot(text: &str, current: &AppState) -> Result<(AppState, ImportReport), CoreError> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|err| CoreError::MalformedPayload(format!("invalid JSON: {err}")))?;
        let state = Self::normalize_imported_state(&raw, current)?;
        let offered = raw
            .get("txs")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        let report = ImportReport {
            imported: state.txs.len(),
            dropped: offered.saturating_sub(state.txs.len()),
            categories: state.budgets.len(),
        };
        Ok((state, report))
    }

    /// Serializes the full state, catalog included, in the export format.
    pub fn export_snapshot(state: &AppState) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(state)?)
    }

    /// Leniently reads a stored state blob. Anything unusable is `None`.
    pub fn load_persisted_state(text: &str, fallback: &AppState) -> Option<AppState> {
        let raw: Value = serde_json::from_str(text).ok()?;
        Self::normalize_imported_state(&raw, fallback).ok()
    }
}

//! The whole-application state blob.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize};

use crate::category::{default_budgets, BudgetCategory};
use crate::transaction::Transaction;

/// Overall monthly ceiling used on first run.
pub const DEFAULT_MONTHLY_CAP_YEN: i64 = 200_000;

/// Controls how amounts are displayed. Never affects stored values.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// Plain minor currency units (yen).
    #[default]
    Minor,
    /// Groups of 10,000 minor units (man).
    Major,
}

impl UnitMode {
    /// Resolves a raw token. Only the exact major-unit tokens select
    /// [`UnitMode::Major`]; anything else falls back to minor units.
    pub fn from_token(value: &str) -> Self {
        match value {
            "major" | "man" => UnitMode::Major,
            _ => UnitMode::Minor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMode::Minor => "minor",
            UnitMode::Major => "major",
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UnitMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|token| UnitMode::from_token(&token))
            .unwrap_or_default())
    }
}

/// Everything the tracker persists: overall cap, display mode, the ledger and
/// the budget catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub monthly_cap_yen: i64,
    #[serde(default)]
    pub unit_mode: UnitMode,
    #[serde(default)]
    pub txs: Vec<Transaction>,
    #[serde(default = "default_budgets")]
    pub budgets: Vec<BudgetCategory>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            monthly_cap_yen: DEFAULT_MONTHLY_CAP_YEN,
            unit_mode: UnitMode::Minor,
            txs: Vec::new(),
            budgets: default_budgets(),
        }
    }
}

impl AppState {
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.txs.iter().find(|txn| txn.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_mode_accepts_legacy_tokens() {
        assert_eq!(UnitMode::from_token("man"), UnitMode::Major);
        assert_eq!(UnitMode::from_token("major"), UnitMode::Major);
        assert_eq!(UnitMode::from_token("yen"), UnitMode::Minor);
        assert_eq!(UnitMode::from_token("MAJOR"), UnitMode::Minor);
    }

    #[test]
    fn state_deserializes_with_missing_optional_fields() {
        let state: AppState =
            serde_json::from_str(r#"{"monthlyCapYen": 1000, "unitMode": "man"}"#).unwrap();
        assert_eq!(state.monthly_cap_yen, 1000);
        assert_eq!(state.unit_mode, UnitMode::Major);
        assert!(state.txs.is_empty());
        assert_eq!(state.budgets, default_budgets());
    }

    #[test]
    fn unit_mode_serializes_lowercase() {
        let json = serde_json::to_string(&UnitMode::Major).unwrap();
        assert_eq!(json, "\"major\"");
    }
}

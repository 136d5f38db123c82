//! Derived monthly view produced by the aggregator.

use chrono::NaiveDate;
use serde::Serialize;

use crate::month::MonthToken;

/// Usage of one category within a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    pub key: String,
    pub name: String,
    pub cap_yen: i64,
    pub used_yen: i64,
    /// `cap_yen - used_yen`; negative when over budget.
    pub remaining_yen: i64,
}

impl CategoryUsage {
    pub fn is_over_budget(&self) -> bool {
        self.remaining_yen < 0
    }
}

/// A transaction as listed in the monthly view, with its resolved label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthEntry {
    pub id: String,
    pub date: NaiveDate,
    pub category_key: String,
    /// Catalog name, or the raw key for orphaned transactions.
    pub category_name: String,
    pub ticker: String,
    pub note: String,
    pub amount_yen: i64,
}

/// Per-month totals across the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month: MonthToken,
    pub overall_cap_yen: i64,
    pub used_total: i64,
    /// `overall_cap_yen - used_total`; negative when over budget.
    pub remaining_total: i64,
    /// Percentage of the overall cap consumed. Zero when the cap is zero.
    pub usage_rate: f64,
    pub categories: Vec<CategoryUsage>,
    pub orphaned: Vec<CategoryUsage>,
    pub transactions: Vec<MonthEntry>,
}

impl MonthSummary {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_total < 0
    }

    pub fn category(&self, key: &str) -> Option<&CategoryUsage> {
        self.categories.iter().find(|row| row.key == key)
    }
}

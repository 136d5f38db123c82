//! Domain models for ledger transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Displayable;
use crate::month::MonthToken;

/// A single cash outlay booked against a budget category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub category_key: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub note: String,
    pub amount_yen: i64,
}

impl Transaction {
    pub fn new(date: NaiveDate, category_key: impl Into<String>, amount_yen: i64) -> Self {
        Self {
            id: new_transaction_id(),
            date,
            category_key: category_key.into(),
            ticker: String::new(),
            note: String::new(),
            amount_yen,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Returns `true` when the transaction falls in the given reporting month.
    pub fn in_month(&self, month: &MonthToken) -> bool {
        month.contains(self.date)
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {} {}", self.date, self.category_key, self.amount_yen)
    }
}

/// Unvalidated transaction input as collected by a frontend.
///
/// Dates and amounts stay in their raw form until the ledger validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub id: Option<String>,
    pub date: String,
    pub category_key: String,
    pub ticker: String,
    pub note: String,
    pub amount_yen: f64,
}

impl TransactionDraft {
    pub fn new(date: impl Into<String>, category_key: impl Into<String>, amount_yen: f64) -> Self {
        Self {
            date: date.into(),
            category_key: category_key.into(),
            amount_yen,
            ..Self::default()
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Generates a fresh opaque transaction identifier.
pub fn new_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_uses_camel_case_export_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let txn = Transaction::new(date, "NASDAQ", 10_000).with_ticker("QQQ");
        let json = serde_json::to_value(&txn).expect("serialize");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["categoryKey"], "NASDAQ");
        assert_eq!(json["amountYen"], 10_000);
        assert_eq!(json["ticker"], "QQQ");
        assert_eq!(json["note"], "");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(new_transaction_id(), new_transaction_id());
    }
}

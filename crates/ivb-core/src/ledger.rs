//! Business logic helpers for managing ledger transactions.

use std::collections::HashSet;

use chrono::NaiveDate;
use ivb_domain::{new_transaction_id, Transaction, TransactionDraft, MAX_AMOUNT_YEN};
use serde_json::Value;

use crate::coerce;
use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Provides validated helpers for the transaction ledger.
pub struct TransactionService;

impl TransactionService {
    /// Validates `draft`, appends it and returns the stored transaction.
    ///
    /// Checks run in order and stop at the first failure: date present, date
    /// well-formed, category present, amount positive. A missing or already
    /// used id is replaced with a fresh one.
    pub fn add(
        ledger: &mut Vec<Transaction>,
        draft: TransactionDraft,
    ) -> Result<Transaction, ValidationError> {
        let mut transaction = Self::validate(draft)?;
        if transaction.id.is_empty() || ledger.iter().any(|txn| txn.id == transaction.id) {
            transaction.id = new_transaction_id();
        }
        ledger.push(transaction.clone());
        Ok(transaction)
    }

    /// Removes the first transaction with `id`. Unknown ids are a no-op.
    pub fn remove(ledger: &mut Vec<Transaction>, id: &str) -> bool {
        match ledger.iter().position(|txn| txn.id == id) {
            Some(position) => {
                ledger.remove(position);
                true
            }
            None => false,
        }
    }

    /// Rewrites `category_key` on every transaction booked against `old_key`.
    pub fn remap_category(ledger: &mut [Transaction], old_key: &str, new_key: &str) -> usize {
        let mut count = 0;
        for txn in ledger.iter_mut().filter(|txn| txn.category_key == old_key) {
            txn.category_key = new_key.to_string();
            count += 1;
        }
        count
    }

    /// Builds a fresh ledger from untyped records.
    ///
    /// Records failing validation are dropped without error. Ids are kept
    /// when present; a repeated id within the batch is re-issued.
    pub fn import_replace(raw: &[Value]) -> Vec<Transaction> {
        let mut seen = HashSet::new();
        let mut imported = Vec::with_capacity(raw.len());
        for record in raw.iter().filter(|record| record.is_object()) {
            let draft = Self::draft_from_value(record);
            let mut transaction = match Self::validate(draft) {
                Ok(transaction) => transaction,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping invalid imported transaction");
                    continue;
                }
            };
            if transaction.id.is_empty() || seen.contains(&transaction.id) {
                transaction.id = new_transaction_id();
            }
            seen.insert(transaction.id.clone());
            imported.push(transaction);
        }
        imported
    }

    /// Returns the ledger ordered by date. Same-day entries keep ledger order.
    pub fn sorted_by_date(ledger: &[Transaction]) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = ledger.iter().collect();
        sorted.sort_by_key(|txn| txn.date);
        sorted
    }

    fn validate(draft: TransactionDraft) -> Result<Transaction, ValidationError> {
        let raw_date = draft.date.trim();
        if raw_date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(raw_date.to_string()))?;
        let category_key = draft.category_key.trim();
        if category_key.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        let amount_yen = whole_yen(draft.amount_yen).ok_or(ValidationError::InvalidAmount)?;

        Ok(Transaction {
            id: draft.id.map(|id| id.trim().to_string()).unwrap_or_default(),
            date,
            category_key: category_key.to_string(),
            ticker: draft.ticker.trim().to_string(),
            note: draft.note.trim().to_string(),
            amount_yen,
        })
    }

    fn draft_from_value(record: &Value) -> TransactionDraft {
        TransactionDraft {
            id: Some(coerce::text_field(record, "id")),
            date: coerce::text_field(record, "date"),
            category_key: coerce::text_field(record, "categoryKey"),
            ticker: coerce::text_field(record, "ticker"),
            note: coerce::text_field(record, "note"),
            amount_yen: coerce::number_field(record, "amountYen").unwrap_or(0.0),
        }
    }
}

/// Rounds a raw amount to whole yen. Anything not strictly positive or above
/// [`MAX_AMOUNT_YEN`] is rejected.
fn whole_yen(amount: f64) -> Option<i64> {
    if !amount.is_finite() {
        return None;
    }
    let rounded = amount.round();
    if rounded <= 0.0 || rounded > MAX_AMOUNT_YEN as f64 {
        return None;
    }
    Some(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_assigns_id_and_trims_text() {
        let mut ledger = Vec::new();
        let draft = TransactionDraft::new("2024-03-01", " NASDAQ ", 10_000.0)
            .with_ticker(" QQQ ")
            .with_note(" monthly ");
        let stored = TransactionService::add(&mut ledger, draft).expect("valid draft");
        assert!(!stored.id.is_empty());
        assert_eq!(stored.category_key, "NASDAQ");
        assert_eq!(stored.ticker, "QQQ");
        assert_eq!(stored.note, "monthly");
        assert_eq!(stored.date, date(2024, 3, 1));
        assert_eq!(ledger, vec![stored]);
    }

    #[test]
    fn add_validates_in_order() {
        let mut ledger = Vec::new();
        let cases = [
            (TransactionDraft::new("", "", 0.0), ValidationError::MissingDate),
            (
                TransactionDraft::new("2024-02-30", "", 0.0),
                ValidationError::InvalidDate("2024-02-30".into()),
            ),
            (
                TransactionDraft::new("2024-03-01", "  ", 0.0),
                ValidationError::MissingCategory,
            ),
            (
                TransactionDraft::new("2024-03-01", "A", 0.0),
                ValidationError::InvalidAmount,
            ),
            (
                TransactionDraft::new("2024-03-01", "A", -5.0),
                ValidationError::InvalidAmount,
            ),
            (
                TransactionDraft::new("2024-03-01", "A", f64::INFINITY),
                ValidationError::InvalidAmount,
            ),
            (
                TransactionDraft::new("2024-03-01", "A", f64::NAN),
                ValidationError::InvalidAmount,
            ),
            (
                TransactionDraft::new("2024-03-01", "A", 5e18),
                ValidationError::InvalidAmount,
            ),
        ];
        for (draft, expected) in cases {
            let err = TransactionService::add(&mut ledger, draft).expect_err("must fail");
            assert_eq!(err, expected);
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn add_reissues_colliding_id() {
        let mut ledger = Vec::new();
        let first = TransactionService::add(
            &mut ledger,
            TransactionDraft::new("2024-03-01", "A", 1.0).with_id("fixed"),
        )
        .unwrap();
        let second = TransactionService::add(
            &mut ledger,
            TransactionDraft::new("2024-03-02", "A", 1.0).with_id("fixed"),
        )
        .unwrap();
        assert_eq!(first.id, "fixed");
        assert_ne!(second.id, "fixed");
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ledger = vec![Transaction::new(date(2024, 1, 1), "A", 10)];
        let id = ledger[0].id.clone();
        assert!(TransactionService::remove(&mut ledger, &id));
        assert!(!TransactionService::remove(&mut ledger, &id));
        assert!(ledger.is_empty());
    }

    #[test]
    fn remap_category_counts_rewrites() {
        let mut ledger = vec![
            Transaction::new(date(2024, 1, 1), "A", 10),
            Transaction::new(date(2024, 1, 2), "B", 10),
            Transaction::new(date(2024, 1, 3), "A", 10),
        ];
        assert_eq!(TransactionService::remap_category(&mut ledger, "A", "C"), 2);
        let keys: Vec<_> = ledger.iter().map(|t| t.category_key.as_str()).collect();
        assert_eq!(keys, ["C", "B", "C"]);
    }

    #[test]
    fn import_replace_drops_invalid_rows_and_keeps_ids() {
        let raw = vec![
            json!({"id": "t1", "date": "2024-03-01", "categoryKey": "A", "amountYen": 100}),
            json!({"id": "t2", "date": "", "categoryKey": "A", "amountYen": 100}),
            json!({"id": "t3", "date": "2024-03-01", "categoryKey": "", "amountYen": 100}),
            json!({"id": "t4", "date": "2024-03-01", "categoryKey": "A", "amountYen": 0}),
            json!({"id": "t5", "date": "not-a-date", "categoryKey": "A", "amountYen": 5}),
            json!({"date": "2024-03-02", "categoryKey": "B", "amountYen": "250"}),
            json!("garbage"),
        ];
        let imported = TransactionService::import_replace(&raw);
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].id, "t1");
        assert_eq!(imported[0].ticker, "");
        assert!(!imported[1].id.is_empty());
        assert_eq!(imported[1].amount_yen, 250);
    }

    #[test]
    fn amounts_above_the_ceiling_are_rejected() {
        let mut ledger = Vec::new();
        let at_limit = TransactionDraft::new("2024-03-01", "A", MAX_AMOUNT_YEN as f64);
        let stored = TransactionService::add(&mut ledger, at_limit).expect("at the ceiling");
        assert_eq!(stored.amount_yen, MAX_AMOUNT_YEN);

        let raw = vec![
            json!({"date": "2024-03-01", "categoryKey": "A", "amountYen": 5_000_000_000_000_000_000u64}),
            json!({"date": "2024-03-02", "categoryKey": "A", "amountYen": 5_000_000_000_000_000_000u64}),
            json!({"date": "2024-03-03", "categoryKey": "A", "amountYen": 10}),
        ];
        let imported = TransactionService::import_replace(&raw);
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].amount_yen, 10);
    }

    #[test]
    fn import_replace_reissues_duplicate_ids_within_batch() {
        let raw = vec![
            json!({"id": "dup", "date": "2024-03-01", "categoryKey": "A", "amountYen": 1}),
            json!({"id": "dup", "date": "2024-03-02", "categoryKey": "A", "amountYen": 2}),
        ];
        let imported = TransactionService::import_replace(&raw);
        assert_eq!(imported[0].id, "dup");
        assert_ne!(imported[1].id, "dup");
        assert_eq!(imported[1].amount_yen, 2);
    }

    #[test]
    fn sorted_by_date_is_stable() {
        let ledger = vec![
            Transaction::new(date(2024, 3, 2), "A", 1),
            Transaction::new(date(2024, 3, 1), "B", 2),
            Transaction::new(date(2024, 3, 2), "C", 3),
        ];
        let keys: Vec<_> = TransactionService::sorted_by_date(&ledger)
            .into_iter()
            .map(|t| t.category_key.as_str())
            .collect();
        assert_eq!(keys, ["B", "A", "C"]);
    }
}

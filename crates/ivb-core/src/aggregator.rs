//! Monthly usage aggregation.

use std::collections::HashMap;

use ivb_domain::{
    find_category, BudgetCategory, CategoryUsage, MonthEntry, MonthSummary, MonthToken,
    Transaction,
};

use crate::ledger::TransactionService;

/// Computes the monthly view for `month`.
///
/// Pure function of its inputs. Transactions whose category key is missing
/// from `budgets` still count toward the totals and are reported in
/// [`MonthSummary::orphaned`] under their raw key. Totals saturate instead of
/// overflowing.
pub fn compute_month(
    ledger: &[Transaction],
    budgets: &[BudgetCategory],
    month: &MonthToken,
    overall_cap_yen: i64,
) -> MonthSummary {
    let in_month: Vec<&Transaction> = TransactionService::sorted_by_date(ledger)
        .into_iter()
        .filter(|txn| txn.in_month(month))
        .collect();

    let mut per_category: HashMap<&str, i64> = HashMap::new();
    let mut orphan_order: Vec<&str> = Vec::new();
    for txn in &in_month {
        let key = txn.category_key.as_str();
        if find_category(budgets, key).is_none() && !orphan_order.contains(&key) {
            orphan_order.push(key);
        }
        let used = per_category.entry(key).or_insert(0);
        *used = used.saturating_add(txn.amount_yen);
    }

    let used_total = in_month
        .iter()
        .fold(0i64, |total, txn| total.saturating_add(txn.amount_yen));
    let usage_rate = if overall_cap_yen > 0 {
        used_total as f64 / overall_cap_yen as f64 * 100.0
    } else {
        0.0
    };

    let categories = budgets
        .iter()
        .map(|category| {
            let cap_yen = category.cap_yen();
            let used_yen = per_category.get(category.key.as_str()).copied().unwrap_or(0);
            CategoryUsage {
                key: category.key.clone(),
                name: category.name.clone(),
                cap_yen,
                used_yen,
                remaining_yen: cap_yen.saturating_sub(used_yen),
            }
        })
        .collect();

    let orphaned = orphan_order
        .iter()
        .map(|key| {
            let used_yen = per_category.get(key).copied().unwrap_or(0);
            CategoryUsage {
                key: key.to_string(),
                name: key.to_string(),
                cap_yen: 0,
                used_yen,
                remaining_yen: 0i64.saturating_sub(used_yen),
            }
        })
        .collect();

    let transactions = in_month
        .iter()
        .map(|txn| MonthEntry {
            id: txn.id.clone(),
            date: txn.date,
            category_key: txn.category_key.clone(),
            category_name: find_category(budgets, &txn.category_key)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| txn.category_key.clone()),
            ticker: txn.ticker.clone(),
            note: txn.note.clone(),
            amount_yen: txn.amount_yen,
        })
        .collect();

    MonthSummary {
        month: *month,
        overall_cap_yen,
        used_total,
        remaining_total: overall_cap_yen.saturating_sub(used_total),
        usage_rate,
        categories,
        orphaned,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(date: &str, key: &str, amount: i64) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(date, key, amount)
    }

    fn march() -> MonthToken {
        "2024-03".parse().unwrap()
    }

    fn sample_budgets() -> Vec<BudgetCategory> {
        vec![
            BudgetCategory::new("NASDAQ", "Nasdaq", 5.0),
            BudgetCategory::new("OTHER", "Other", 1.0),
        ]
    }

    #[test]
    fn computes_reference_example() {
        let ledger = vec![
            txn("2024-03-01", "NASDAQ", 10_000),
            txn("2024-03-15", "OTHER", 5_000),
            txn("2024-04-01", "NASDAQ", 20_000),
        ];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), 200_000);

        assert_eq!(summary.used_total, 15_000);
        assert_eq!(summary.remaining_total, 185_000);
        assert!((summary.usage_rate - 7.5).abs() < 1e-9);
        let nasdaq = summary.category("NASDAQ").unwrap();
        assert_eq!((nasdaq.used_yen, nasdaq.remaining_yen), (10_000, 40_000));
        let other = summary.category("OTHER").unwrap();
        assert_eq!((other.used_yen, other.remaining_yen), (5_000, 5_000));
        assert_eq!(summary.transaction_count(), 2);
        assert!(summary.orphaned.is_empty());
    }

    #[test]
    fn zero_cap_yields_zero_rate() {
        let ledger = vec![txn("2024-03-01", "NASDAQ", 10_000)];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), 0);
        assert_eq!(summary.usage_rate, 0.0);
        assert_eq!(summary.remaining_total, -10_000);
        assert!(summary.is_over_budget());
    }

    #[test]
    fn orphaned_keys_count_toward_total_with_raw_name() {
        let ledger = vec![
            txn("2024-03-05", "GONE", 3_000),
            txn("2024-03-02", "NASDAQ", 1_000),
            txn("2024-03-09", "GONE", 2_000),
        ];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), 100_000);
        assert_eq!(summary.used_total, 6_000);
        assert_eq!(summary.orphaned.len(), 1);
        assert_eq!(summary.orphaned[0].name, "GONE");
        assert_eq!(summary.orphaned[0].used_yen, 5_000);
        assert_eq!(summary.transactions[0].category_name, "Nasdaq");
        assert_eq!(summary.transactions[1].category_name, "GONE");
    }

    #[test]
    fn entries_are_sorted_by_date() {
        let ledger = vec![
            txn("2024-03-20", "NASDAQ", 1),
            txn("2024-03-01", "OTHER", 2),
            txn("2024-03-10", "NASDAQ", 3),
        ];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), 10);
        let amounts: Vec<_> = summary.transactions.iter().map(|e| e.amount_yen).collect();
        assert_eq!(amounts, [2, 3, 1]);
    }

    #[test]
    fn over_budget_category_has_negative_remaining() {
        let ledger = vec![txn("2024-03-01", "OTHER", 15_000)];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), 200_000);
        let other = summary.category("OTHER").unwrap();
        assert_eq!(other.remaining_yen, -5_000);
        assert!(other.is_over_budget());
    }

    #[test]
    fn huge_totals_saturate() {
        let ledger = vec![
            txn("2024-03-01", "NASDAQ", i64::MAX / 2 + 1),
            txn("2024-03-02", "NASDAQ", i64::MAX / 2 + 1),
            txn("2024-03-03", "GONE", i64::MAX),
            txn("2024-03-04", "GONE", 1),
        ];
        let summary = compute_month(&ledger, &sample_budgets(), &march(), -1);
        assert_eq!(summary.used_total, i64::MAX);
        assert_eq!(summary.remaining_total, i64::MIN);
        let nasdaq = summary.category("NASDAQ").unwrap();
        assert_eq!(nasdaq.used_yen, i64::MAX);
        assert_eq!(nasdaq.remaining_yen, 50_000 - i64::MAX);
        assert_eq!(summary.orphaned[0].used_yen, i64::MAX);
        assert_eq!(summary.orphaned[0].remaining_yen, -i64::MAX);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let ledger = vec![txn("2024-03-01", "NASDAQ", 10_000)];
        let budgets = sample_budgets();
        let first = compute_month(&ledger, &budgets, &march(), 50_000);
        let second = compute_month(&ledger, &budgets, &march(), 50_000);
        assert_eq!(first, second);
    }
}

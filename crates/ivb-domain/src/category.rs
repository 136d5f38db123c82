//! Domain types representing budget categories.

use serde::{Deserialize, Serialize};

use crate::common::{man_to_yen, Displayable};

/// A named spending bucket with a monthly cap, identified by a unique key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub key: String,
    pub name: String,
    /// Monthly cap in units of 10,000 yen.
    #[serde(rename = "monthlyMan", default)]
    pub monthly_man: f64,
}

impl BudgetCategory {
    pub fn new(key: impl Into<String>, name: impl Into<String>, monthly_man: f64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            monthly_man,
        }
    }

    /// Returns the authoritative monthly cap in minor currency units.
    pub fn cap_yen(&self) -> i64 {
        man_to_yen(self.monthly_man)
    }
}

impl Displayable for BudgetCategory {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.key)
    }
}

const DEFAULT_CATALOG: [(&str, &str, f64); 8] = [
    ("NASDAQ", "Nasdaq 100", 5.0),
    ("US_TECH", "US Tech", 4.0),
    ("JP_HEAVY", "JP Heavy Industry", 3.0),
    ("JP_BANK", "JP Banks", 3.0),
    ("JP_SEMI", "JP Semiconductors", 2.0),
    ("JP_GAME", "JP Gaming", 1.0),
    ("JP_RE", "JP Real Estate", 1.0),
    ("OTHER", "Other", 1.0),
];

/// Returns the built-in catalog used on first run and whenever a catalog
/// would otherwise be empty.
pub fn default_budgets() -> Vec<BudgetCategory> {
    DEFAULT_CATALOG
        .iter()
        .map(|(key, name, man)| BudgetCategory::new(*key, *name, *man))
        .collect()
}

/// Finds a category by key.
pub fn find_category<'a>(budgets: &'a [BudgetCategory], key: &str) -> Option<&'a BudgetCategory> {
    budgets.iter().find(|category| category.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_unique_keys() {
        let budgets = default_budgets();
        assert_eq!(budgets.len(), 8);
        let mut keys: Vec<_> = budgets.iter().map(|b| b.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn category_serializes_with_monthly_man_field() {
        let category = BudgetCategory::new("NASDAQ", "Nasdaq", 5.0);
        let json = serde_json::to_string(&category).expect("serialize");
        assert!(json.contains("\"monthlyMan\":5.0"));
        assert_eq!(category.cap_yen(), 50_000);
    }
}

//! Budget catalog maintenance: normalization, key management and caps.

use std::collections::HashSet;

use chrono::Utc;
use ivb_domain::{default_budgets, BudgetCategory};
use serde_json::Value;
use uuid::Uuid;

use crate::coerce;
use crate::error::ValidationError;

/// Validated operations over a budget catalog.
///
/// Every operation leaves the catalog with unique, non-empty keys and at least
/// one entry.
pub struct CatalogService;

impl CatalogService {
    /// Normalizes an untyped list of category-like records.
    ///
    /// Non-array input reads as empty and non-object elements are skipped.
    /// Blank keys become `CAT_<position>`, blank names fall back to the key,
    /// and negative or non-finite caps are clamped to zero. The first record
    /// wins when keys repeat. An empty result yields the default catalog.
    pub fn normalize(raw: &Value) -> Vec<BudgetCategory> {
        let records = raw.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let candidates = records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_object())
            .map(|(index, record)| {
                Self::resolve(
                    index,
                    &coerce::text_field(record, "key"),
                    &coerce::text_field(record, "name"),
                    coerce::number_field(record, "monthlyMan"),
                )
            });
        Self::dedupe(candidates)
    }

    /// Applies the [`CatalogService::normalize`] rules to typed records.
    pub fn normalize_list(list: Vec<BudgetCategory>) -> Vec<BudgetCategory> {
        let candidates = list.into_iter().enumerate().map(|(index, category)| {
            Self::resolve(
                index,
                &category.key,
                &category.name,
                Some(category.monthly_man),
            )
        });
        Self::dedupe(candidates)
    }

    /// Appends a category and returns it.
    ///
    /// A missing or blank key is generated; a supplied key that already exists
    /// is rejected.
    pub fn add_category(
        catalog: &mut Vec<BudgetCategory>,
        key: Option<&str>,
        name: Option<&str>,
        monthly_man: Option<f64>,
    ) -> Result<BudgetCategory, ValidationError> {
        let key = match key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => {
                if catalog.iter().any(|category| category.key == key) {
                    return Err(ValidationError::DuplicateKey(key.to_string()));
                }
                key.to_string()
            }
            None => Self::generate_key(catalog),
        };
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(key.as_str())
            .to_string();
        let category = BudgetCategory::new(key, name, clamp_cap(monthly_man));
        catalog.push(category.clone());
        Ok(category)
    }

    /// Changes the key of the entry at `index` and returns the previous key.
    ///
    /// Callers must cascade the returned key into the ledger with
    /// [`crate::TransactionService::remap_category`].
    pub fn rename_key(
        catalog: &mut [BudgetCategory],
        index: usize,
        new_key: &str,
    ) -> Result<String, ValidationError> {
        if index >= catalog.len() {
            return Err(ValidationError::CategoryIndexOutOfRange(index));
        }
        let new_key = new_key.trim();
        if new_key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        let duplicate = catalog
            .iter()
            .enumerate()
            .any(|(position, category)| position != index && category.key == new_key);
        if duplicate {
            return Err(ValidationError::DuplicateKey(new_key.to_string()));
        }
        let entry = &mut catalog[index];
        Ok(std::mem::replace(&mut entry.key, new_key.to_string()))
    }

    pub fn update_cap(
        catalog: &mut [BudgetCategory],
        index: usize,
        monthly_man: f64,
    ) -> Result<(), ValidationError> {
        if !monthly_man.is_finite() || monthly_man < 0.0 {
            return Err(ValidationError::InvalidCap);
        }
        let entry = catalog
            .get_mut(index)
            .ok_or(ValidationError::CategoryIndexOutOfRange(index))?;
        entry.monthly_man = monthly_man;
        Ok(())
    }

    /// Sets the display name; a blank name falls back to the key.
    pub fn rename_display(
        catalog: &mut [BudgetCategory],
        index: usize,
        name: &str,
    ) -> Result<(), ValidationError> {
        let entry = catalog
            .get_mut(index)
            .ok_or(ValidationError::CategoryIndexOutOfRange(index))?;
        let trimmed = name.trim();
        entry.name = if trimmed.is_empty() {
            entry.key.clone()
        } else {
            trimmed.to_string()
        };
        Ok(())
    }

    /// Removes the entry at `index`. Transactions referencing its key are left
    /// as they are. Removing the last entry restores the default catalog.
    pub fn remove_category(
        catalog: &mut Vec<BudgetCategory>,
        index: usize,
    ) -> Result<BudgetCategory, ValidationError> {
        if index >= catalog.len() {
            return Err(ValidationError::CategoryIndexOutOfRange(index));
        }
        let removed = catalog.remove(index);
        if catalog.is_empty() {
            *catalog = default_budgets();
        }
        Ok(removed)
    }

    pub fn reset_to_default() -> Vec<BudgetCategory> {
        default_budgets()
    }

    fn resolve(index: usize, key: &str, name: &str, monthly_man: Option<f64>) -> BudgetCategory {
        let key = match key.trim() {
            "" => format!("CAT_{}", index + 1),
            trimmed => trimmed.to_string(),
        };
        let name = match name.trim() {
            "" => key.clone(),
            trimmed => trimmed.to_string(),
        };
        BudgetCategory::new(key, name, clamp_cap(monthly_man))
    }

    fn dedupe(candidates: impl Iterator<Item = BudgetCategory>) -> Vec<BudgetCategory> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for category in candidates {
            if !seen.insert(category.key.clone()) {
                tracing::debug!(key = %category.key, "dropping duplicate category key");
                continue;
            }
            unique.push(category);
        }
        if unique.is_empty() {
            default_budgets()
        } else {
            unique
        }
    }

    fn generate_key(catalog: &[BudgetCategory]) -> String {
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let candidate = format!("CAT_{}_{}", Utc::now().timestamp_millis(), &suffix[..4]);
            if !catalog.iter().any(|category| category.key == candidate) {
                return candidate;
            }
        }
    }
}

fn clamp_cap(monthly_man: Option<f64>) -> f64 {
    match monthly_man {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

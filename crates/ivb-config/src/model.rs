use std::path::{Path, PathBuf};

use ivb_domain::{AppState, UnitMode, DEFAULT_MONTHLY_CAP_YEN};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "INVEST_BUDGET_HOME";
const HOME_DIR_NAME: &str = ".invest_budget";
const DATA_DIR_NAME: &str = "data";

/// User preferences. Every field has a default so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding stored state. Defaults to `<base>/data`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_monthly_cap_value")]
    pub default_monthly_cap_yen: i64,
    #[serde(default)]
    pub default_unit_mode: UnitMode,
    #[serde(default = "Config::default_backup_retention_value")]
    pub backup_retention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_monthly_cap_yen: Self::default_monthly_cap_value(),
            default_unit_mode: UnitMode::default(),
            backup_retention: Self::default_backup_retention_value(),
            log_filter: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_monthly_cap_value() -> i64 {
        DEFAULT_MONTHLY_CAP_YEN
    }

    pub fn default_backup_retention_value() -> usize {
        5
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => base.join(DATA_DIR_NAME),
        }
    }

    /// State used on first run, before anything has been stored.
    pub fn initial_state(&self) -> AppState {
        AppState {
            monthly_cap_yen: self.default_monthly_cap_yen.max(0),
            unit_mode: self.default_unit_mode,
            ..AppState::default()
        }
    }
}

/// Base directory for config and data: `$INVEST_BUDGET_HOME`, else
/// `~/.invest_budget`.
pub fn resolve_base_dir() -> PathBuf {
    if let Some(path) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOME_DIR_NAME)
}

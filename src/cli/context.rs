//! Shell state, command dispatch and shared argument helpers.

use chrono::Local;
use ivb_config::{Config, ConfigManager};
use ivb_core::{BudgetTracker, MemoryStore, MoneyFormatter};
use ivb_domain::MonthToken;
use ivb_storage_json::JsonFileStore;
use strsim::levenshtein;

use crate::cli::commands::{self, CommandDefinition, CommandRegistry};
use crate::cli::output::{self, OutputPreferences};
use crate::errors::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CliError>;

pub struct ShellContext {
    mode: CliMode,
    registry: CommandRegistry,
    pub(crate) tracker: BudgetTracker,
    config: Config,
    config_manager: ConfigManager,
    backups: Option<JsonFileStore>,
    pub(crate) running: bool,
}

impl ShellContext {
    /// Opens the tracker over the configured data directory. When the
    /// directory cannot be prepared the session runs in memory.
    pub fn new(mode: CliMode, config_manager: ConfigManager, config: Config) -> Self {
        output::set_preferences(OutputPreferences {
            plain_mode: !config.ui_color_enabled || mode == CliMode::Script,
        });

        let data_dir = config_manager.data_dir(&config);
        let (tracker, backups) = match JsonFileStore::with_retention(data_dir.clone(), config.backup_retention) {
            Ok(store) => {
                tracing::debug!(path = %data_dir.display(), "using on-disk store");
                let backups = store.clone();
                (BudgetTracker::open(Box::new(store), config.initial_state()), Some(backups))
            }
            Err(err) => {
                tracing::warn!(error = %err, "data directory unavailable; running in memory");
                output::warning(format!("{err}. Changes will not be saved this session."));
                (BudgetTracker::open(Box::new(MemoryStore::new()), config.initial_state()), None)
            }
        };

        let mut context = Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            tracker,
            config,
            config_manager,
            backups,
            running: true,
        };
        context.flush_storage_warning();
        context
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// Applies `change` to the settings and writes `config.json`. Nothing is
    /// kept when the write fails.
    pub(crate) fn update_config(&mut self, change: impl FnOnce(&mut Config)) -> CommandResult {
        let mut updated = self.config.clone();
        change(&mut updated);
        self.config_manager.save(&updated)?;
        self.config = updated;
        Ok(())
    }

    /// The on-disk store, when this session has one.
    pub(crate) fn backups(&self) -> Result<&JsonFileStore, CliError> {
        self.backups
            .as_ref()
            .ok_or_else(|| CliError::input("Backups are unavailable while running in memory."))
    }

    pub(crate) fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        if self.tracker.is_persistent() {
            "invest> ".into()
        } else {
            "invest (memory)> ".into()
        }
    }

    pub(crate) fn dispatch(&mut self, command: &str, raw: &str, args: &[&str]) -> CommandResult {
        let Some(handler) = self.command(command).map(|definition| definition.handler) else {
            self.suggest_command(raw);
            return Ok(());
        };
        let result = handler(self, args);
        self.flush_storage_warning();
        result
    }

    pub(crate) fn report_error(&self, err: CliError) {
        tracing::debug!(error = %err, "command failed");
        output::error(err);
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    /// Formats `yen` in the current display unit.
    pub(crate) fn money(&self, yen: i64) -> String {
        self.tracker.unit_mode().format_amount(yen)
    }

    /// Parses an optional `YYYY-MM` argument, defaulting to the current month.
    pub(crate) fn month_arg(&self, raw: Option<&&str>) -> Result<MonthToken, CliError> {
        match raw {
            Some(token) => token
                .parse::<MonthToken>()
                .map_err(|err| CliError::from(ivb_core::ValidationError::from(err))),
            None => Ok(MonthToken::from_date(Local::now().date_naive())),
        }
    }

    fn flush_storage_warning(&mut self) {
        if let Some(err) = self.tracker.take_storage_warning() {
            output::warning(format!(
                "{err}. Continuing without saving; changes last until you exit."
            ));
        }
    }
}

pub(crate) fn required<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CliError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CliError::input(format!("usage: {usage}")))
}

pub(crate) fn parse_index(raw: &str) -> Result<usize, CliError> {
    raw.parse::<usize>()
        .map_err(|_| CliError::input(format!("`{raw}` is not a category number")))
}

pub(crate) fn parse_number(raw: &str, what: &str) -> Result<f64, CliError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CliError::input(format!("{what} must be a number, got `{raw}`")))
}

use std::{fs, path::PathBuf};

use chrono::Local;
use ivb_core::{storage::STATE_KEY, BudgetTracker};

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{parse_index, required, CliMode, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};
use crate::errors::CliError;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "export",
            "Write a JSON snapshot (defaults to the config directory)",
            "export [path]",
            cmd_export,
        ),
        CommandDefinition::new(
            "import",
            "Replace all data with a JSON snapshot",
            "import <path>",
            cmd_import,
        ),
        CommandDefinition::new(
            "backups",
            "List automatic backups of the ledger, newest first",
            "backups",
            cmd_backups,
        ),
        CommandDefinition::new(
            "restore",
            "Roll the ledger back to a listed backup",
            "restore <n>",
            cmd_restore,
        ),
        CommandDefinition::new(
            "clear",
            "Erase all stored data",
            "clear [--yes]",
            cmd_clear,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args.first() {
        Some(path) => PathBuf::from(path),
        None => context
            .config_manager()
            .base_dir()
            .join(BudgetTracker::export_file_name(Local::now().date_naive())),
    };
    let snapshot = context.tracker.export_snapshot()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, snapshot)?;
    tracing::info!(path = %path.display(), "snapshot exported");
    output::success(format!("Exported to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = required(args, 0, "import <path>")?;
    let text = fs::read_to_string(path)?;
    let report = context.tracker.import_snapshot(&text)?;
    output::success(format!(
        "Imported {} transaction(s) and {} categories.",
        report.imported, report.categories
    ));
    if report.dropped > 0 {
        output::warning(format!("{} invalid transaction(s) were skipped.", report.dropped));
    }
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.backups()?.list_backups(STATE_KEY)?;
    if backups.is_empty() {
        output::info("No backups yet. One is taken each time the ledger is saved over.");
        return Ok(());
    }
    output::section("Backups");
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Taken at"),
        TableColumn::left("File"),
    ]);
    for (index, backup) in backups.iter().enumerate() {
        table.push_row(vec![
            index.to_string(),
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            backup.file_name.clone(),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

/// Imports the chosen backup over the current ledger. The catalog is kept
/// since backups of the ledger do not carry one.
fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = parse_index(required(args, 0, "restore <n>")?)?;
    let store = context.backups()?;
    let backup = store
        .list_backups(STATE_KEY)?
        .into_iter()
        .nth(index)
        .ok_or_else(|| CliError::input(format!("No backup #{index}; run `backups` to list them.")))?;
    let text = store.read_backup(&backup)?;
    let report = context.tracker.import_snapshot(&text)?;
    tracing::info!(file = %backup.file_name, "backup restored");
    output::success(format!(
        "Restored {} ({} transaction(s)).",
        backup.file_name, report.imported
    ));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let confirmed = args.first().is_some_and(|flag| *flag == "--yes");
    if context.mode() == CliMode::Interactive && !confirmed {
        output::warning("This erases every transaction and category. Run `clear --yes` to confirm.");
        return Ok(());
    }
    context.tracker.clear_all();
    output::success("All data cleared.");
    Ok(())
}

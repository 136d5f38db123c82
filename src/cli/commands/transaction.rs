use ivb_core::{format_rate, ValidationError};
use ivb_domain::{man_to_yen, Displayable, TransactionDraft, UnitMode, MAX_AMOUNT_YEN};

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{parse_number, required, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};
use crate::errors::CliError;

const ADD_USAGE: &str = "add <YYYY-MM-DD> <category-key> <amount> [ticker] [note]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "summary",
            "Show monthly usage against caps",
            "summary [YYYY-MM]",
            cmd_summary,
        ),
        CommandDefinition::new(
            "list",
            "List the transactions of a month",
            "list [YYYY-MM]",
            cmd_list,
        ),
        CommandDefinition::new("add", "Record an investment", ADD_USAGE, cmd_add),
        CommandDefinition::new("remove", "Delete a transaction by id", "remove <id>", cmd_remove),
        CommandDefinition::new(
            "cap",
            "Set the overall monthly cap in yen",
            "cap <yen>",
            cmd_cap,
        ),
        CommandDefinition::new(
            "unit",
            "Switch the display unit",
            "unit <minor|major>",
            cmd_unit,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = context.month_arg(args.first())?;
    let summary = context.tracker.compute_month(&month);

    output::section(format!("Summary {}", summary.month));
    output::info(format!("Cap       : {}", context.money(summary.overall_cap_yen)));
    output::info(format!("Used      : {}", context.money(summary.used_total)));
    let remaining = context.money(summary.remaining_total);
    let remaining = if summary.is_over_budget() {
        output::alert(&remaining)
    } else {
        remaining
    };
    output::info(format!("Remaining : {}", remaining));
    output::info(format!("Usage     : {}", format_rate(summary.usage_rate)));

    let mut table = Table::new(vec![
        TableColumn::left("Key"),
        TableColumn::left("Name").truncated(24),
        TableColumn::right("Cap"),
        TableColumn::right("Used"),
        TableColumn::right("Remaining"),
    ]);
    for row in summary.categories.iter().chain(&summary.orphaned) {
        let remaining = context.money(row.remaining_yen);
        table.push_row(vec![
            row.key.clone(),
            row.name.clone(),
            context.money(row.cap_yen),
            context.money(row.used_yen),
            if row.is_over_budget() {
                output::alert(&remaining)
            } else {
                remaining
            },
        ]);
    }
    println!("{}", table.render());
    if !summary.orphaned.is_empty() {
        output::warning(format!(
            "{} key(s) are not in the catalog: {}",
            summary.orphaned.len(),
            summary
                .orphaned
                .iter()
                .map(|row| row.key.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = context.month_arg(args.first())?;
    let summary = context.tracker.compute_month(&month);
    if summary.transactions.is_empty() {
        output::info(format!("No transactions in {}.", summary.month));
        return Ok(());
    }

    output::section(format!("Transactions {}", summary.month));
    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::left("Category").truncated(20),
        TableColumn::left("Ticker"),
        TableColumn::left("Note").truncated(24),
        TableColumn::right("Amount"),
        TableColumn::left("Id"),
    ]);
    for entry in &summary.transactions {
        table.push_row(vec![
            entry.date.format("%Y-%m-%d").to_string(),
            entry.category_name.clone(),
            entry.ticker.clone(),
            entry.note.clone(),
            context.money(entry.amount_yen),
            entry.id.clone(),
        ]);
    }
    println!("{}", table.render());
    output::info(format!(
        "{} transaction(s), total {}",
        summary.transaction_count(),
        context.money(summary.used_total)
    ));
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let date = required(args, 0, ADD_USAGE)?;
    let key = required(args, 1, ADD_USAGE)?;
    let amount = parse_amount(required(args, 2, ADD_USAGE)?, context.tracker.unit_mode())?;
    let mut draft = TransactionDraft::new(date, key, amount);
    if let Some(ticker) = args.get(3) {
        draft = draft.with_ticker(*ticker);
    }
    if args.len() > 4 {
        draft = draft.with_note(args[4..].join(" "));
    }

    let stored = context.tracker.add_transaction(draft)?;
    output::success(format!(
        "Added {} to {} on {} (id {}).",
        context.money(stored.amount_yen),
        stored.category_key,
        stored.date.format("%Y-%m-%d"),
        stored.id
    ));
    if context.tracker.budgets().iter().all(|category| category.key != stored.category_key) {
        output::warning(format!(
            "`{}` is not in the catalog; it will show up as an orphaned key.",
            stored.category_key
        ));
    }
    Ok(())
}

/// Amounts are typed in the current display unit. A trailing `円` or `万`
/// overrides it.
fn parse_amount(raw: &str, mode: UnitMode) -> Result<f64, CliError> {
    let raw = raw.trim().replace(',', "");
    let (digits, mode) = if let Some(value) = raw.strip_suffix('万') {
        (value.to_string(), UnitMode::Major)
    } else if let Some(value) = raw.strip_suffix('円') {
        (value.to_string(), UnitMode::Minor)
    } else {
        (raw, mode)
    };
    let value = parse_number(&digits, "Amount")?;
    Ok(match mode {
        UnitMode::Minor => value,
        UnitMode::Major => man_to_yen(value) as f64,
    })
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = required(args, 0, "remove <id>")?;
    let Some(label) = context.tracker.state().transaction(id).map(Displayable::display_label) else {
        output::warning(format!("No transaction with id `{id}`."));
        return Ok(());
    };
    context.tracker.remove_transaction(id);
    output::success(format!("Removed transaction {label}."));
    Ok(())
}

fn cmd_cap(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = required(args, 0, "cap <yen>")?;
    let cap_yen = parse_cap(raw)?;
    context.tracker.set_monthly_cap(cap_yen)?;
    output::success(format!(
        "Monthly cap set to {}.",
        context.money(context.tracker.state().monthly_cap_yen)
    ));
    Ok(())
}

/// Whole yen in `0..=MAX_AMOUNT_YEN`. Negative input is rejected before
/// rounding.
fn parse_cap(raw: &str) -> Result<i64, CliError> {
    let value = parse_number(&raw.replace(',', ""), "Cap")?;
    if value < 0.0 || value.round() > MAX_AMOUNT_YEN as f64 {
        return Err(ValidationError::InvalidCap.into());
    }
    Ok(value.round() as i64)
}

fn cmd_unit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mode = match required(args, 0, "unit <minor|major>")?.to_ascii_lowercase().as_str() {
        "minor" | "yen" => UnitMode::Minor,
        "major" | "man" => UnitMode::Major,
        other => return Err(CliError::input(format!("unknown unit `{other}`; use minor or major"))),
    };
    context.tracker.set_unit_mode(mode);
    output::success(format!("Amounts are now shown in {} units.", mode));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_follow_the_display_unit() {
        assert_eq!(parse_amount("10,000", UnitMode::Minor).unwrap(), 10_000.0);
        assert_eq!(parse_amount("1.5", UnitMode::Major).unwrap(), 15_000.0);
        assert_eq!(parse_amount("3万", UnitMode::Minor).unwrap(), 30_000.0);
        assert_eq!(parse_amount("500円", UnitMode::Major).unwrap(), 500.0);
        assert!(parse_amount("lots", UnitMode::Minor).is_err());
    }

    #[test]
    fn caps_must_be_in_range() {
        assert_eq!(parse_cap("250,000").unwrap(), 250_000);
        assert_eq!(parse_cap("0").unwrap(), 0);
        for raw in ["-0.4", "-1", "1e30", "inf"] {
            assert!(parse_cap(raw).is_err(), "{raw}");
        }
    }
}

use ivb_domain::Displayable;

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{parse_index, parse_number, required, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "categories",
            "List budget categories",
            "categories",
            cmd_categories,
        ),
        CommandDefinition::new(
            "category-add",
            "Add a category (key generated when omitted)",
            "category-add [key] [name] [man]",
            cmd_add,
        ),
        CommandDefinition::new(
            "category-rename",
            "Change a category key and move its transactions",
            "category-rename <idx> <key>",
            cmd_rename,
        ),
        CommandDefinition::new(
            "category-label",
            "Change a category display name",
            "category-label <idx> <name>",
            cmd_label,
        ),
        CommandDefinition::new(
            "category-cap",
            "Set a category monthly cap in 万",
            "category-cap <idx> <man>",
            cmd_cap,
        ),
        CommandDefinition::new(
            "category-remove",
            "Remove a category (transactions are kept)",
            "category-remove <idx>",
            cmd_remove,
        ),
        CommandDefinition::new(
            "category-reset",
            "Restore the built-in categories",
            "category-reset",
            cmd_reset,
        ),
    ]
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Budget categories");
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Key"),
        TableColumn::left("Name").truncated(24),
        TableColumn::right("Monthly cap"),
    ]);
    for (index, category) in context.tracker.budgets().iter().enumerate() {
        table.push_row(vec![
            index.to_string(),
            category.key.clone(),
            category.name.clone(),
            context.money(category.cap_yen()),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let monthly_man = args
        .get(2)
        .map(|raw| parse_number(raw, "Cap"))
        .transpose()?;
    let added = context
        .tracker
        .add_category(args.first().copied(), args.get(1).copied(), monthly_man)?;
    output::success(format!(
        "Added category {} ({}) with cap {}.",
        added.key,
        added.name,
        context.money(added.cap_yen())
    ));
    Ok(())
}

fn cmd_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "category-rename <idx> <key>";
    let index = parse_index(required(args, 0, USAGE)?)?;
    let key = required(args, 1, USAGE)?;
    let moved = context.tracker.rename_category(index, key)?;
    output::success(format!(
        "Category {index} is now `{}`; {moved} transaction(s) moved.",
        key.trim()
    ));
    Ok(())
}

fn cmd_label(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "category-label <idx> <name>";
    let index = parse_index(required(args, 0, USAGE)?)?;
    required(args, 1, USAGE)?;
    context
        .tracker
        .rename_category_label(index, &args[1..].join(" "))?;
    output::success(format!(
        "Category {index} is now labelled `{}`.",
        context.tracker.budgets()[index].name
    ));
    Ok(())
}

fn cmd_cap(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "category-cap <idx> <man>";
    let index = parse_index(required(args, 0, USAGE)?)?;
    let monthly_man = parse_number(required(args, 1, USAGE)?, "Cap")?;
    context.tracker.update_category_cap(index, monthly_man)?;
    output::success(format!(
        "Cap for {} set to {}.",
        context.tracker.budgets()[index].key,
        context.money(context.tracker.budgets()[index].cap_yen())
    ));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = parse_index(required(args, 0, "category-remove <idx>")?)?;
    let removed = context.tracker.remove_category(index)?;
    output::success(format!("Removed category {}.", removed.display_label()));
    let orphaned = context
        .tracker
        .transactions()
        .iter()
        .filter(|txn| txn.category_key == removed.key)
        .count();
    if orphaned > 0 {
        output::info(format!(
            "{orphaned} transaction(s) still reference `{}`.",
            removed.key
        ));
    }
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.tracker.reset_categories();
    output::success("Categories restored to the defaults.");
    Ok(())
}

use ivb_core::ValidationError;
use ivb_domain::{UnitMode, MAX_AMOUNT_YEN};

use crate::cli::commands::CommandDefinition;
use crate::cli::context::{parse_number, required, CommandResult, ShellContext};
use crate::cli::output;
use crate::errors::CliError;
use crate::utils::build_info;

const CONFIG_USAGE: &str =
    "config [set <default-cap|default-unit|backup-retention|color|log-filter> <value>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "config",
            "Show or change the stored settings",
            CONFIG_USAGE,
            cmd_config,
        ),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Invest Budget {}", meta.version));
    output::info(format!("  Build hash : {} ({})", meta.git_hash, meta.git_status));
    output::info(format!("  Built at   : {}", meta.timestamp));
    output::info(format!("  Target     : {}", meta.target));
    output::info(format!("  Profile    : {}", meta.profile));
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        None => show_config(context),
        Some(&"set") => {
            let field = required(args, 1, CONFIG_USAGE)?;
            let value = required(args, 2, CONFIG_USAGE)?;
            set_config(context, field, value)
        }
        Some(_) => Err(CliError::input(format!("usage: {CONFIG_USAGE}"))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = context.config();
    let manager = context.config_manager();
    output::section("Configuration");
    output::info(format!("  Config file    : {}", manager.config_path().display()));
    output::info(format!("  Data directory : {}", manager.data_dir(config).display()));
    output::info(format!("  Default cap    : {} 円", config.default_monthly_cap_yen));
    output::info(format!("  Default unit   : {}", config.default_unit_mode));
    output::info(format!("  Backups kept   : {}", config.backup_retention));
    output::info(format!(
        "  Colours        : {}",
        if config.ui_color_enabled { "on" } else { "off" }
    ));
    output::info(format!(
        "  Log filter     : {}",
        config.log_filter.as_deref().unwrap_or("-")
    ));
    output::info(format!(
        "  Storage        : {}",
        if context.tracker.is_persistent() {
            "on disk"
        } else {
            "memory only"
        }
    ));
    Ok(())
}

/// Stores one setting in `config.json`. Changes apply from the next session.
fn set_config(context: &mut ShellContext, field: &str, value: &str) -> CommandResult {
    match field {
        "default-cap" => {
            let cap = parse_number(&value.replace(',', ""), "Cap")?;
            if cap < 0.0 || cap.round() > MAX_AMOUNT_YEN as f64 {
                return Err(ValidationError::InvalidCap.into());
            }
            context.update_config(|config| config.default_monthly_cap_yen = cap.round() as i64)?;
        }
        "default-unit" => {
            let mode = match value.to_ascii_lowercase().as_str() {
                "minor" | "yen" => UnitMode::Minor,
                "major" | "man" => UnitMode::Major,
                other => {
                    return Err(CliError::input(format!("unknown unit `{other}`; use minor or major")))
                }
            };
            context.update_config(|config| config.default_unit_mode = mode)?;
        }
        "backup-retention" => {
            let keep = value
                .parse::<usize>()
                .ok()
                .filter(|keep| *keep > 0)
                .ok_or_else(|| CliError::input(format!("`{value}` is not a positive whole number")))?;
            context.update_config(|config| config.backup_retention = keep)?;
        }
        "color" => {
            let enabled = match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                other => return Err(CliError::input(format!("`{other}` is not on or off"))),
            };
            context.update_config(|config| config.ui_color_enabled = enabled)?;
        }
        "log-filter" => {
            let filter = (value != "-").then(|| value.to_string());
            context.update_config(|config| config.log_filter = filter)?;
        }
        other => return Err(CliError::input(format!("unknown setting `{other}`; usage: {CONFIG_USAGE}"))),
    }
    tracing::info!(field, value, "configuration updated");
    output::success(format!(
        "Saved {field} = {value} to {}.",
        context.config_manager().config_path().display()
    ));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(command) => {
                output::section(format!("Help: {}", command.name));
                output::info(format!("  Description: {}", command.description));
                output::info(format!("  Usage: {}", command.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Available commands");
    for command in context.registry().iter() {
        output::info(format!("  {:<16} {}", command.name, command.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.running = false;
    Ok(())
}

pub mod commands;
pub mod context;
pub mod output;
mod shell;
pub mod table;

pub use shell::{run_cli, SCRIPT_ENV};

pub mod commands;
pub mod context;
mod help;
mod io;
pub mod output;
mod registry;
mod shell;

pub use context::{CliError, CliMode, CommandError, ShellContext, SCRIPT_ENV};
pub use shell::run_cli;

//! Shell state, dispatch, and the CLI error types.

use std::{io, sync::Arc};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::{
        services::{CancelOutcome, DeliveryOutcome, ReminderService},
        Clock, GoalStore, SystemClock,
    },
    domain::Goal,
    errors::SavingsError,
    navigation::{NavigationError, Navigator, Screen},
    notifications::{LocalNotifier, Permission},
    storage::JsonFileStore,
};

use super::commands;
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

/// Setting this variable switches the shell to non-interactive script mode.
pub const SCRIPT_ENV: &str = "GOAL_SAVINGS_CLI_SCRIPT";

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

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Savings(#[from] SavingsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Savings(#[from] SavingsError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: GoalStore,
    pub reminders: ReminderService,
    pub navigator: Navigator,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        if mode == CliMode::Script {
            colored::control::set_override(false);
        }
        let config = config_manager.load()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let snapshots = JsonFileStore::new(config_manager.data_dir(&config))?;
        let mut store =
            GoalStore::new(Box::new(snapshots), Arc::clone(&clock)).with_policy(config.withdrawal_policy);
        let report = store.load()?;
        for warning in &report.warnings {
            cli_io::print_warning(warning);
        }
        let mut reminders = ReminderService::new(Box::new(LocalNotifier::new()), clock)
            .with_currency(config.currency.clone())
            .with_count(config.reminder_count);
        if let Ok(Permission::Denied) = reminders.initialize() {
            tracing::warn!("notification permission denied; reminders disabled");
        }

        let mut registry = CommandRegistry::new();
        for entry in commands::all_definitions() {
            registry.register(entry);
        }

        Ok(Self {
            mode,
            registry,
            store,
            reminders,
            navigator: Navigator::new(),
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            running: true,
        })
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        let screen = self.navigator.current();
        match screen.goal_id().and_then(|id| self.store.goal(id)) {
            Some(goal) => format!("savings:{}[{}]> ", screen.token(), goal.name),
            None => format!("savings:{}> ", screen.token()),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = super::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    /// Asks before destructive actions; script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Savings(SavingsError::NotFound(_)) => {
                cli_io::print_error(&err.to_string());
                output::hint("Run `goals` to list goal names.");
                Ok(())
            }
            other => {
                cli_io::print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    /// Resolves a goal from an argument (name, id prefix, or 1-based list
    /// position) or, when absent, from the current screen.
    pub(crate) fn resolve_goal(&self, arg: Option<&str>) -> Result<Goal, CommandError> {
        let Some(query) = arg else {
            return self
                .navigator
                .current()
                .goal_id()
                .and_then(|id| self.store.goal(id))
                .cloned()
                .ok_or_else(|| {
                    CommandError::InvalidArguments(
                        "no goal selected; pass a goal name or open one with `show`".into(),
                    )
                });
        };
        if let Ok(position) = query.parse::<usize>() {
            if let Some(goal) = position.checked_sub(1).and_then(|i| self.store.goals().get(i)) {
                return Ok(goal.clone());
            }
        }
        self.store.find(query).cloned().ok_or_else(|| {
            CommandError::InvalidArguments(format!("no goal matches `{}`", query))
        })
    }

    /// Moves to `screen`, ignoring the validation error for stale goals.
    pub(crate) fn show_screen(&mut self, screen: Screen) {
        if let Err(err) = self.navigator.navigate(screen, &self.store) {
            tracing::debug!(error = %err, "navigation skipped");
        }
    }

    pub(crate) fn report_delivery(&self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Scheduled(_) => {}
            DeliveryOutcome::Partial {
                scheduled,
                failed,
                reason,
            } => cli_io::print_warning(format!(
                "{} notification(s) scheduled, {} failed: {}",
                scheduled, failed, reason
            )),
            DeliveryOutcome::Unavailable { reason } => {
                cli_io::print_warning(format!("Notifications unavailable: {}", reason))
            }
        }
    }

    pub(crate) fn report_cancel(&self, outcome: &CancelOutcome) {
        match outcome {
            CancelOutcome::Cancelled(count) => {
                cli_io::print_success(format!("Cancelled {} pending reminder(s).", count))
            }
            CancelOutcome::Partial { cancelled, failed } => cli_io::print_warning(format!(
                "Cancelled {} reminder(s); {} could not be cancelled.",
                cancelled, failed
            )),
            CancelOutcome::Unavailable { reason } => {
                cli_io::print_warning(format!("Notifications unavailable: {}", reason))
            }
        }
    }

    pub(crate) fn currency(&self) -> &str {
        &self.config.currency
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.store.clock().today()
    }

    pub(crate) fn goal_id_for_screen(&self, arg: Option<&str>) -> Result<Option<Uuid>, CommandError> {
        match arg {
            Some(query) => Ok(Some(self.resolve_goal(Some(query))?.id)),
            None => Ok(self.navigator.current().goal_id()),
        }
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

/// Accepts `50`, `1,250.75`, or `KD 50`.
pub(crate) fn parse_amount(input: &str, currency: &str) -> Result<f64, CommandError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(currency)
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

#[cfg(test)]
pub(crate) fn process_script(
    config_manager: ConfigManager,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_config_manager(CliMode::Script, config_manager)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn parse_amount_accepts_grouping_and_currency() {
        assert_eq!(parse_amount("1,250.75", "KD").unwrap(), 1250.75);
        assert_eq!(parse_amount("KD 50", "KD").unwrap(), 50.0);
        assert!(parse_amount("lots", "KD").is_err());
    }

    #[test]
    fn script_creates_goal_and_posts_money() {
        let dir = TempDir::new().unwrap();
        let app = process_script(
            manager(&dir),
            &[
                "create \"Gaming PC\" 1200 2030-01-01 gift monthly 100",
                "add \"gaming pc\" 300",
                "withdraw 4 50 Repairs",
            ],
        )
        .unwrap();
        let goal = app.store.find("Gaming PC").unwrap();
        assert_eq!(goal.current(), 250.0);
        assert_eq!(goal.progress(), 21);
        assert_eq!(app.store.transactions_for(goal.id).len(), 2);
    }

    #[test]
    fn navigation_follows_show_and_back() {
        let dir = TempDir::new().unwrap();
        let mut app = process_script(manager(&dir), &["show \"New Car\"", "go withdraw"]).unwrap();
        let id = app.store.find("New Car").unwrap().id;
        assert_eq!(app.navigator.current(), Screen::Withdraw { goal_id: id });
        app.process_line("back").unwrap();
        assert_eq!(app.navigator.current(), Screen::GoalDetails { goal_id: id });
    }

    #[test]
    fn rejected_withdrawal_keeps_the_current_screen() {
        let dir = TempDir::new().unwrap();
        let app = process_script(
            manager(&dir),
            &["show \"Dream Vacation\"", "withdraw \"Dream Vacation\" 9000"],
        )
        .unwrap();
        let goal = app.store.find("Dream Vacation").unwrap();
        assert_eq!(goal.current(), 2100.0);
        assert_eq!(app.navigator.current(), Screen::GoalDetails { goal_id: goal.id });
    }

    #[test]
    fn delete_of_open_goal_returns_to_goal_list() {
        let dir = TempDir::new().unwrap();
        let app = process_script(manager(&dir), &["show 1", "delete"]).unwrap();
        assert_eq!(app.store.goals().len(), 2);
        assert_eq!(app.navigator.current(), Screen::Goals);
    }

    #[test]
    fn exit_stops_processing() {
        let dir = TempDir::new().unwrap();
        let app = process_script(manager(&dir), &["exit", "delete 1"]).unwrap();
        assert_eq!(app.store.goals().len(), 3);
    }
}

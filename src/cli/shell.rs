use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::context::{CliError, CliMode, CommandError, LoopControl, ShellContext, SCRIPT_ENV};
use crate::cli::output::{info as output_info, section as output_section};
use crate::utils::format::format_amount;

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::from_context(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output_section("Goal Savings");
    output_info(format!(
        "{} goal(s), {} saved. Type `help` for commands.",
        context.store.goals().len(),
        format_amount(context.store.total_saved(), context.currency())
    ));

    while context.running {
        let prompt = context.prompt();
        match editor.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
                // Goal names change with create/update/delete.
                editor.set_helper(Some(CommandHelper::from_context(context)));
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Reads commands from stdin, one per line. Blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match handle_line(context, trimmed) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Completes command names in the first position and goal names after it,
/// and hints the usage line of a fully typed command.
struct CommandHelper {
    commands: Vec<(String, &'static str)>,
    goal_names: Vec<String>,
}

impl CommandHelper {
    fn from_context(context: &ShellContext) -> Self {
        let entries = context
            .command_names()
            .into_iter()
            .filter_map(|name| context.command(name).map(|entry| (name, entry.usage)))
            .collect();
        let goal_names = context
            .store
            .goals()
            .iter()
            .map(|goal| goal.name.clone())
            .collect();
        Self::new(entries, goal_names)
    }

    fn new(entries: Vec<(&'static str, &'static str)>, goal_names: Vec<String>) -> Self {
        let mut commands: Vec<(String, &'static str)> = entries
            .into_iter()
            .map(|(name, usage)| (name.to_ascii_lowercase(), usage))
            .collect();
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        commands.dedup_by(|a, b| a.0 == b.0);
        Self {
            commands,
            goal_names,
        }
    }

    fn goal_candidates(&self, needle: &str) -> Vec<Pair> {
        let needle = needle.trim_start_matches('"').to_lowercase();
        self.goal_names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: if name.contains(' ') {
                    format!("\"{}\"", name)
                } else {
                    name.clone()
                },
            })
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let trimmed = prefix.trim_start();
        let leading = prefix.len() - trimmed.len();

        if let Some(space_idx) = trimmed.find(char::is_whitespace) {
            let rest = &trimmed[space_idx..];
            let arg_start = leading + space_idx + (rest.len() - rest.trim_start().len());
            if rest.trim_start().contains(char::is_whitespace) && !rest.trim_start().starts_with('"') {
                return Ok((pos, Vec::new()));
            }
            return Ok((arg_start, self.goal_candidates(&prefix[arg_start..])));
        }

        let needle = trimmed.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|(name, _)| name.starts_with(&needle))
            .map(|(name, _)| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((leading, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos != line.len() || !line.ends_with(' ') {
            return None;
        }
        let typed = line.trim().to_ascii_lowercase();
        let (_, usage) = self.commands.iter().find(|(name, _)| *name == typed)?;
        let tail = usage.strip_prefix(typed.as_str())?.trim_start();
        (!tail.is_empty()).then(|| tail.to_string())
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
    }
}

impl Validator for CommandHelper {}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_names_stay_together() {
        let tokens = parse_command_line("add \"Dream Vacation\" 50 debit").unwrap();
        assert_eq!(tokens, vec!["add", "Dream Vacation", "50", "debit"]);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line("create \"Trip 100").is_err());
    }

    #[test]
    fn command_list_is_sorted_and_unique() {
        let helper = CommandHelper::new(
            vec![("goals", "goals"), ("go", "go <screen>"), ("Goals", "goals")],
            Vec::new(),
        );
        let names: Vec<_> = helper.commands.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["go", "goals"]);
    }

    #[test]
    fn goal_names_with_spaces_are_quoted() {
        let helper = CommandHelper::new(Vec::new(), vec!["New Car".into(), "Laptop".into()]);
        let pairs = helper.goal_candidates("\"ne");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "\"New Car\"");
        assert_eq!(helper.goal_candidates("lap")[0].replacement, "Laptop");
    }
}

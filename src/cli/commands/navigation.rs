use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::navigation::Screen;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "go",
            "Switch screen",
            "go <banking|goals|create|details|addmoney|withdraw|reminders> [goal]",
            cmd_go,
        ),
        CommandEntry::new("back", "Return to the previous screen", "back", cmd_back),
    ]
}

fn cmd_go(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(token) = args.first() else {
        io::print_info(format!("Current screen: {}", context.navigator.current()));
        return Ok(());
    };
    let goal_id = context.goal_id_for_screen(args.get(1).copied())?;
    let screen = Screen::from_token(token, goal_id)?;
    let screen = context
        .navigator
        .navigate(screen, &context.store)
        .map_err(CommandError::from)?;
    io::print_info(format!("Now on: {}", screen));
    Ok(())
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let screen = context.navigator.back();
    io::print_info(format!("Now on: {}", screen));
    Ok(())
}

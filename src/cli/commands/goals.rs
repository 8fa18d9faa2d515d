use std::str::FromStr;

use crate::cli::context::{parse_amount, parse_date, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{progress_bar, render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::core::services::{ContributionService, SummaryService};
use crate::domain::{Frequency, GoalCategory, GoalUpdate, NewGoal};
use crate::navigation::Screen;
use crate::utils::format::{format_amount, format_signed};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("goals", "List savings goals", "goals", cmd_goals),
        CommandEntry::new(
            "create",
            "Create a savings goal",
            "create <name> <target> <deadline YYYY-MM-DD> [category] [frequency] [contribution]",
            cmd_create,
        ),
        CommandEntry::new("show", "Show goal details", "show [goal]", cmd_show),
        CommandEntry::new(
            "update",
            "Change goal fields",
            "update [goal] <field=value>... (name, target, current, deadline, category, frequency, contribution, color)",
            cmd_update,
        ),
        CommandEntry::new("delete", "Delete a goal and its history", "delete [goal]", cmd_delete),
        CommandEntry::new("history", "Show a goal's transactions", "history [goal]", cmd_history),
        CommandEntry::new("total", "Show total saved across goals", "total", cmd_total),
        CommandEntry::new(
            "suggest",
            "Suggest a periodic contribution",
            "suggest [goal] | suggest <target> <deadline YYYY-MM-DD> [frequency]",
            cmd_suggest,
        ),
    ]
}

fn cmd_goals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.show_screen(Screen::Goals);
    let goals = context.store.goals();
    if goals.is_empty() {
        io::print_info("No savings goals yet. Use `create` to add one.");
        return Ok(());
    }
    let today = context.today();
    let currency = context.currency();
    let rows: Vec<Vec<String>> = SummaryService::overviews(goals, today)
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            vec![
                (index + 1).to_string(),
                row.name,
                row.category.to_string(),
                format!("{} {:>3}%", progress_bar(row.progress, 10), row.progress),
                format!(
                    "{} / {}",
                    format_amount(row.current, currency),
                    format_amount(row.target, currency)
                ),
                format!("{} days", row.days_left),
                if row.on_track { "on track".into() } else { "behind".into() },
            ]
        })
        .collect();
    output_section("Savings Goals");
    render_table(
        &["#", "Goal", "Category", "Progress", "Saved", "Left", "Status"],
        &rows,
    );
    io::print_info(format!(
        "Total saved: {}",
        format_amount(context.store.total_saved(), currency)
    ));
    Ok(())
}

fn cmd_create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: create <name> <target> <deadline YYYY-MM-DD> [category] [frequency] [contribution]"
                .into(),
        ));
    }
    let target = parse_amount(args[1], context.currency())?;
    let deadline = parse_date(args[2])?;
    let category = match args.get(3) {
        Some(raw) => GoalCategory::from_str(raw).map_err(CommandError::InvalidArguments)?,
        None => GoalCategory::default(),
    };
    let frequency = match args.get(4) {
        Some(raw) => Frequency::from_str(raw).map_err(CommandError::InvalidArguments)?,
        None => Frequency::default(),
    };
    let suggested =
        ContributionService::suggested_contribution(target, deadline, frequency, context.today());
    let contribution = match args.get(5) {
        Some(raw) => parse_amount(raw, context.currency())?,
        None => suggested,
    };

    let draft = NewGoal::new(args[0], target, deadline)
        .with_category(category)
        .with_frequency(frequency)
        .with_contribution(contribution);
    let goal = context.store.create_goal(draft)?;
    io::print_success(format!(
        "Goal `{}` created: {} by {}.",
        goal.name,
        format_amount(goal.target, context.currency()),
        goal.deadline
    ));
    if suggested > 0.0 {
        io::print_info(format!(
            "Suggested {} contribution: {}",
            frequency,
            format_amount(suggested, context.currency())
        ));
    } else {
        io::print_warning("Deadline leaves no full period; no contribution suggested.");
    }
    context.show_screen(Screen::GoalDetails { goal_id: goal.id });
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let goal = context.resolve_goal(args.first().copied())?;
    context.show_screen(Screen::GoalDetails { goal_id: goal.id });
    let currency = context.currency();
    let today = context.today();
    output_section(&goal.name);
    io::print_info(format!(
        "  Progress     : {} {}%",
        progress_bar(goal.progress(), 20),
        goal.progress()
    ));
    io::print_info(format!(
        "  Saved        : {} of {}",
        format_amount(goal.current(), currency),
        format_amount(goal.target, currency)
    ));
    io::print_info(format!("  Remaining    : {}", format_amount(goal.remaining(), currency)));
    io::print_info(format!(
        "  Deadline     : {} ({} days left)",
        goal.deadline,
        SummaryService::days_left(&goal, today)
    ));
    io::print_info(format!("  Category     : {}", goal.category));
    io::print_info(format!(
        "  Contribution : {} {}",
        format_amount(goal.contribution_amount, currency),
        goal.frequency
    ));
    io::print_info(format!(
        "  Status       : {}",
        if goal.is_complete() {
            "complete"
        } else if SummaryService::is_on_track(&goal) {
            "on track"
        } else {
            "behind"
        }
    ));
    let recent: Vec<_> = context.store.transactions_for(goal.id).into_iter().take(3).collect();
    if !recent.is_empty() {
        io::print_info("  Recent activity:");
        for txn in recent {
            io::print_info(format!(
                "    {:<7} {:<20} {}",
                txn.date_label(),
                txn.kind.to_string(),
                format_signed(txn.amount, currency)
            ));
        }
    }
    Ok(())
}

fn cmd_update(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (goal_arg, assignments) = match args.first() {
        Some(first) if !first.contains('=') => (Some(*first), &args[1..]),
        _ => (None, args),
    };
    if assignments.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: update [goal] <field=value>...".into(),
        ));
    }
    let goal = context.resolve_goal(goal_arg)?;
    let mut changes = GoalUpdate::default();
    for assignment in assignments {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected field=value, got `{}`", assignment))
        })?;
        let currency = context.currency();
        match field.trim().to_ascii_lowercase().as_str() {
            "name" => changes.name = Some(value.to_string()),
            "target" => changes.target = Some(parse_amount(value, currency)?),
            "current" => changes.current = Some(parse_amount(value, currency)?),
            "deadline" => changes.deadline = Some(parse_date(value)?),
            "category" => {
                changes.category =
                    Some(GoalCategory::from_str(value).map_err(CommandError::InvalidArguments)?)
            }
            "frequency" => {
                changes.frequency =
                    Some(Frequency::from_str(value).map_err(CommandError::InvalidArguments)?)
            }
            "contribution" => changes.contribution_amount = Some(parse_amount(value, currency)?),
            "color" => {
                changes.color = Some(Some(value.trim().to_string()).filter(|c| !c.is_empty()))
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown field `{}`",
                    other
                )))
            }
        }
    }
    let updated = context.store.update_goal(goal.id, changes)?;
    io::print_success(format!(
        "Goal `{}` updated ({}%).",
        updated.name,
        updated.progress()
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let goal = context.resolve_goal(args.first().copied())?;
    if !context.confirm(&format!("Delete goal `{}` and its history?", goal.name))? {
        io::print_info("Delete cancelled.");
        return Ok(());
    }
    if context.store.delete_goal(goal.id)? {
        io::print_success(format!("Goal `{}` deleted.", goal.name));
    }
    context.navigator.revalidate(&context.store);
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let goal = context.resolve_goal(args.first().copied())?;
    let currency = context.currency();
    let rows: Vec<Vec<String>> = context
        .store
        .transactions_for(goal.id)
        .into_iter()
        .map(|txn| {
            vec![
                txn.date_label(),
                txn.kind.to_string(),
                txn.payment_method.clone().unwrap_or_default(),
                format_signed(txn.amount, currency),
            ]
        })
        .collect();
    output_section(format!("History: {}", goal.name));
    if rows.is_empty() {
        io::print_info("No transactions yet.");
    } else {
        render_table(&["Date", "Type", "Method", "Amount"], &rows);
    }
    Ok(())
}

fn cmd_total(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    io::print_info(format!(
        "Total saved: {} across {} goal(s)",
        format_amount(context.store.total_saved(), context.currency()),
        context.store.goals().len()
    ));
    Ok(())
}

fn cmd_suggest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let today = context.today();
    let currency = context.currency().to_string();
    if args.len() >= 2 {
        let target = parse_amount(args[0], &currency)?;
        let deadline = parse_date(args[1])?;
        let frequency = match args.get(2) {
            Some(raw) => Frequency::from_str(raw).map_err(CommandError::InvalidArguments)?,
            None => Frequency::default(),
        };
        let amount = ContributionService::suggested_contribution(target, deadline, frequency, today);
        io::print_info(format!(
            "Save {} {} to reach {} by {}.",
            format_amount(amount, &currency),
            frequency,
            format_amount(target, &currency),
            deadline
        ));
        return Ok(());
    }

    let goal = context.resolve_goal(args.first().copied())?;
    let amount = ContributionService::suggestion_for(&goal, today);
    let periods = ContributionService::periods_remaining(&goal, today);
    if amount > 0.0 {
        io::print_info(format!(
            "Save {} {} for {} period(s) to finish `{}`.",
            format_amount(amount, &currency),
            goal.frequency,
            periods,
            goal.name
        ));
    } else if goal.remaining() == 0.0 {
        io::print_success(format!("`{}` is fully funded.", goal.name));
    } else {
        io::print_warning(format!("`{}` has no full period left before its deadline.", goal.name));
    }
    Ok(())
}

use chrono::{Duration, NaiveTime};

use crate::cli::context::{parse_amount, parse_date, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::core::services::{DeliveryOutcome, ReminderSettings};
use crate::navigation::Screen;
use crate::notifications::ReminderCadence;
use crate::utils::format::format_amount;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "remind",
            "Schedule savings reminders",
            "remind [goal] <weekly|monthly|both> [amount] | remind [goal] once <YYYY-MM-DD> [amount]",
            cmd_remind,
        ),
        CommandEntry::new("reminders", "List pending reminders", "reminders", cmd_reminders),
        CommandEntry::new(
            "cancel-reminders",
            "Cancel every pending reminder",
            "cancel-reminders",
            cmd_cancel_reminders,
        ),
    ]
}

const PLANS: [&str; 4] = ["weekly", "monthly", "both", "once"];

fn cmd_remind(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let plan_index = args
        .iter()
        .position(|arg| PLANS.contains(&arg.to_ascii_lowercase().as_str()))
        .ok_or_else(|| {
            CommandError::InvalidArguments(
                "choose a reminder plan: weekly, monthly, both, or once".into(),
            )
        })?;
    let goal_arg = match plan_index {
        0 => None,
        1 => Some(args[0]),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: remind [goal] <plan> [amount]".into(),
            ))
        }
    };
    let goal = context.resolve_goal(goal_arg)?;
    let plan = args[plan_index].to_ascii_lowercase();
    let rest = &args[plan_index + 1..];
    let currency = context.config.currency.clone();
    context.show_screen(Screen::Reminders { goal_id: goal.id });

    if plan == "once" {
        let date = rest
            .first()
            .ok_or_else(|| CommandError::InvalidArguments("a reminder date is required".into()))
            .and_then(|raw| parse_date(raw))?;
        let amount = match rest.get(1) {
            Some(raw) => parse_amount(raw, &currency)?,
            None => goal.contribution_amount,
        };
        let time = NaiveTime::from_hms_opt(context.config.reminder_hour, 0, 0)
            .unwrap_or_default();
        let at = date.and_time(time).and_utc();
        if at <= context.store.clock().now() {
            return Err(CommandError::InvalidArguments(
                "reminder time must be in the future".into(),
            ));
        }
        let outcome = context
            .reminders
            .schedule_payment_reminder(&goal.name, amount, at);
        if let DeliveryOutcome::Scheduled(_) = outcome {
            io::print_success(format!(
                "Reminder set for {} to add {} to {}.",
                at.format("%Y-%m-%d %H:%M UTC"),
                format_amount(amount, &currency),
                goal.name
            ));
        }
        context.report_delivery(&outcome);
        return Ok(());
    }

    let amount = match rest.first() {
        Some(raw) => parse_amount(raw, &currency)?,
        None => goal.contribution_amount,
    };
    if amount <= 0.0 {
        return Err(CommandError::InvalidArguments(
            "goal has no contribution amount; pass one explicitly".into(),
        ));
    }
    let settings = ReminderSettings {
        weekly: plan == "weekly" || plan == "both",
        monthly: plan == "monthly" || plan == "both",
        amount,
    };
    for (cadence, outcome) in context.reminders.apply_settings(&goal.name, &settings) {
        if let DeliveryOutcome::Scheduled(count) = outcome {
            let per = match cadence {
                ReminderCadence::Weekly => settings.weekly_amount(),
                ReminderCadence::Monthly => settings.amount,
            };
            io::print_success(format!(
                "Scheduled {} {} reminder(s) for {} at {} each.",
                count,
                cadence,
                goal.name,
                format_amount(per, &currency)
            ));
        }
        context.report_delivery(&outcome);
    }
    Ok(())
}

fn cmd_reminders(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let pending = context.reminders.pending()?;
    output_section("Pending reminders");
    if pending.is_empty() {
        io::print_info("No reminders scheduled.");
        return Ok(());
    }
    let now = context.store.clock().now();
    let rows: Vec<Vec<String>> = pending
        .iter()
        .map(|item| {
            let until = item.scheduled_at - now;
            vec![
                item.id.to_string(),
                item.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
                describe_wait(until),
                item.title.clone(),
                item.body.clone(),
            ]
        })
        .collect();
    render_table(&["Id", "When", "In", "Title", "Message"], &rows);
    Ok(())
}

fn cmd_cancel_reminders(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let outcome = context.reminders.cancel_all();
    context.report_cancel(&outcome);
    Ok(())
}

fn describe_wait(until: Duration) -> String {
    if until.num_days() >= 1 {
        format!("{}d", until.num_days())
    } else if until.num_hours() >= 1 {
        format!("{}h", until.num_hours())
    } else {
        format!("{}m", until.num_minutes().max(0))
    }
}

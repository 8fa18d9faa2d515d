use crate::cli::context::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::core::services::WithdrawalPolicy;
use crate::navigation::Screen;
use crate::notifications::TransferDirection;
use crate::utils::format::format_amount;

/// Funding sources offered on the add-money screen.
pub(crate) const PAYMENT_METHODS: [&str; 3] = ["Checking Account", "Debit Card", "Mobile Wallet"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Add money to a goal",
            "add [goal] <amount> [checking|debit|wallet]",
            cmd_add,
        ),
        CommandEntry::new(
            "withdraw",
            "Withdraw money from a goal",
            "withdraw [goal] <amount> [reason...]",
            cmd_withdraw,
        ),
    ]
}

/// Splits `[goal] <amount> rest...`. The goal may be left out while a goal
/// screen is open; two leading numbers always mean `<goal #> <amount>`.
fn split_goal_and_amount<'a>(
    context: &ShellContext,
    args: &'a [&'a str],
    quick: &[f64],
) -> Result<(Option<&'a str>, f64, &'a [&'a str]), CommandError> {
    let currency = context.currency();
    let goal_open = context.navigator.current().goal_id().is_some();
    match args {
        [] => Err(missing_amount(quick, currency)),
        [first, rest @ ..] if goal_open => {
            let second_is_amount = rest
                .first()
                .is_some_and(|next| parse_amount(next, currency).is_ok());
            match parse_amount(first, currency) {
                Ok(amount) if !second_is_amount => Ok((None, amount, rest)),
                _ => split_explicit(args, quick, currency),
            }
        }
        _ => split_explicit(args, quick, currency),
    }
}

fn split_explicit<'a>(
    args: &'a [&'a str],
    quick: &[f64],
    currency: &str,
) -> Result<(Option<&'a str>, f64, &'a [&'a str]), CommandError> {
    match args {
        [goal, amount, rest @ ..] => Ok((Some(*goal), parse_amount(amount, currency)?, rest)),
        _ => Err(missing_amount(quick, currency)),
    }
}

fn missing_amount(quick: &[f64], currency: &str) -> CommandError {
    let options: Vec<String> = quick
        .iter()
        .map(|amount| format_amount(*amount, currency))
        .collect();
    if options.is_empty() {
        CommandError::InvalidArguments("expected a goal and an amount".into())
    } else {
        CommandError::InvalidArguments(format!(
            "expected a goal and an amount (quick amounts: {})",
            options.join(", ")
        ))
    }
}

fn payment_method(raw: Option<&str>) -> Result<&'static str, CommandError> {
    let Some(raw) = raw else {
        return Ok(PAYMENT_METHODS[0]);
    };
    let needle = raw.trim().to_ascii_lowercase();
    PAYMENT_METHODS
        .iter()
        .copied()
        .find(|method| {
            let lowered = method.to_ascii_lowercase();
            lowered == needle || lowered.starts_with(&needle)
        })
        .or(match needle.as_str() {
            "wallet" => Some(PAYMENT_METHODS[2]),
            _ => None,
        })
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "unknown payment method `{}` (choose from {})",
                raw,
                PAYMENT_METHODS.join(", ")
            ))
        })
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let quick = context.config.quick_add_amounts.clone();
    let (goal_arg, amount, rest) = split_goal_and_amount(context, args, &quick)?;
    let goal = context.resolve_goal(goal_arg)?;
    let method = payment_method(rest.first().copied())?;
    let posting = context.store.apply_credit(goal.id, amount, method)?;
    context.show_screen(Screen::AddMoney { goal_id: goal.id });
    let currency = context.config.currency.clone();
    io::print_success(format!(
        "{} has been added to your {} (via {}).",
        format_amount(posting.transaction.amount, &currency),
        posting.goal.name,
        method
    ));
    io::print_info(format!(
        "New balance: {} ({}%)",
        format_amount(posting.goal.current(), &currency),
        posting.goal.progress()
    ));
    let outcome = context.reminders.notify_transaction(
        TransferDirection::Credit,
        posting.transaction.amount,
        &posting.goal.name,
    );
    context.report_delivery(&outcome);
    Ok(())
}

fn cmd_withdraw(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let quick = context.config.quick_withdraw_amounts.clone();
    let (goal_arg, amount, rest) = split_goal_and_amount(context, args, &quick)?;
    let goal = context.resolve_goal(goal_arg)?;
    let reason = rest.join(" ");
    let posting = context
        .store
        .apply_debit(goal.id, amount, Some(reason.as_str()))?;
    context.show_screen(Screen::Withdraw { goal_id: goal.id });
    let currency = context.config.currency.clone();
    let withdrawn = posting.transaction.amount.abs();
    io::print_success(format!(
        "{} withdrawn from {} ({}).",
        format_amount(withdrawn, &currency),
        posting.goal.name,
        posting.transaction.kind
    ));
    if posting.shortfall > 0.0 && context.store.policy() == WithdrawalPolicy::Clamp {
        io::print_warning(format!(
            "Only {} was available; {} was not withdrawn.",
            format_amount(withdrawn, &currency),
            format_amount(posting.shortfall, &currency)
        ));
    }
    io::print_info(format!(
        "New balance: {} ({}%)",
        format_amount(posting.goal.current(), &currency),
        posting.goal.progress()
    ));
    let outcome =
        context
            .reminders
            .notify_transaction(TransferDirection::Debit, withdrawn, &posting.goal.name);
    context.report_delivery(&outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_accepts_prefixes() {
        assert_eq!(payment_method(None).unwrap(), "Checking Account");
        assert_eq!(payment_method(Some("debit")).unwrap(), "Debit Card");
        assert_eq!(payment_method(Some("wallet")).unwrap(), "Mobile Wallet");
        assert!(payment_method(Some("cash")).is_err());
    }

    #[test]
    fn missing_amount_lists_quick_choices() {
        let err = missing_amount(&[25.0, 50.0], "KD");
        assert_eq!(
            err.to_string(),
            "expected a goal and an amount (quick amounts: KD 25, KD 50)"
        );
    }
}

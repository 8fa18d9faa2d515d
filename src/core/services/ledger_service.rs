//! Balance transitions for a single goal.
//!
//! Every function here is pure: it takes a goal by reference and returns the
//! updated copy together with the transaction that explains the change. The
//! store commits both or neither.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{round_cents, Goal, Transaction, TransactionKind};
use crate::errors::{Result, SavingsError};

/// Payment method recorded on withdrawals.
pub const WITHDRAWAL_METHOD: &str = "Goal Savings";

/// How a debit larger than the available balance is handled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalPolicy {
    /// Reject the debit with [`SavingsError::InsufficientBalance`].
    #[default]
    Strict,
    /// Withdraw whatever is available and record only that amount. An empty
    /// goal still rejects the debit.
    Clamp,
}

/// Result of applying a credit or debit.
#[derive(Debug, Clone)]
pub struct Posting {
    pub goal: Goal,
    pub transaction: Transaction,
    /// Portion of a clamped debit that could not be withdrawn.
    pub shortfall: f64,
}

pub struct LedgerService;

impl LedgerService {
    /// Adds `amount` to the goal and records a `Manual Add` entry.
    pub fn credit(goal: &Goal, amount: f64, method: &str, date: NaiveDate) -> Result<Posting> {
        let amount = Self::validate_amount(amount)?;
        let mut updated = goal.clone();
        updated.set_current(goal.current() + amount);
        let mut transaction = Transaction::new(goal.id, date, amount, TransactionKind::ManualAdd);
        let method = method.trim();
        if !method.is_empty() {
            transaction = transaction.with_payment_method(method);
        }
        Ok(Posting {
            goal: updated,
            transaction,
            shortfall: 0.0,
        })
    }

    /// Withdraws `amount` from the goal according to `policy`.
    pub fn debit(
        goal: &Goal,
        amount: f64,
        reason: Option<&str>,
        date: NaiveDate,
        policy: WithdrawalPolicy,
    ) -> Result<Posting> {
        let requested = Self::validate_amount(amount)?;
        let available = goal.current();
        let applied = if requested > available {
            match policy {
                WithdrawalPolicy::Clamp if available > 0.0 => available,
                _ => {
                    return Err(SavingsError::InsufficientBalance {
                        requested,
                        available,
                    })
                }
            }
        } else {
            requested
        };

        let mut updated = goal.clone();
        updated.set_current(available - applied);
        let transaction = Transaction::new(
            goal.id,
            date,
            -applied,
            TransactionKind::withdrawal(reason),
        )
        .with_payment_method(WITHDRAWAL_METHOD);
        Ok(Posting {
            goal: updated,
            transaction,
            shortfall: round_cents(requested - applied),
        })
    }

    /// Moves the balance to `new_current` through a single adjustment entry.
    ///
    /// Returns `None` when the balance is already at that value.
    pub fn adjust(goal: &Goal, new_current: f64, date: NaiveDate) -> Result<Option<Posting>> {
        if !new_current.is_finite() || new_current < 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "balance must be a non-negative number, got {}",
                new_current
            )));
        }
        let delta = round_cents(new_current - goal.current());
        if delta == 0.0 {
            return Ok(None);
        }
        let mut updated = goal.clone();
        updated.set_current(goal.current() + delta);
        let transaction =
            Transaction::new(goal.id, date, delta, TransactionKind::BalanceAdjustment);
        Ok(Some(Posting {
            goal: updated,
            transaction,
            shortfall: 0.0,
        }))
    }

    /// Folds a goal's ledger on top of its seed balance.
    pub fn replay<'a, I>(seed: f64, transactions: I) -> f64
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        round_cents(seed + transactions.into_iter().map(|txn| txn.amount).sum::<f64>())
    }

    fn validate_amount(amount: f64) -> Result<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "amount must be a positive number, got {}",
                amount
            )));
        }
        let rounded = round_cents(amount);
        if rounded <= 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "amount {} rounds to zero",
                amount
            )));
        }
        Ok(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewGoal;
    use chrono::Utc;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
    }

    fn goal_with(balance: f64) -> Goal {
        let draft = NewGoal::new("Emergency Fund", 5000.0, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        Goal::seeded(draft, balance, Utc::now())
    }

    #[test]
    fn credit_adds_and_records_method() {
        let goal = goal_with(3250.0);
        let posting = LedgerService::credit(&goal, 50.0, "Debit Card", date()).unwrap();
        assert_eq!(posting.goal.current(), 3300.0);
        assert_eq!(posting.goal.progress(), 66);
        assert_eq!(posting.transaction.amount, 50.0);
        assert_eq!(posting.transaction.kind, TransactionKind::ManualAdd);
        assert_eq!(posting.transaction.payment_method.as_deref(), Some("Debit Card"));
    }

    #[test]
    fn credit_rejects_non_positive_amounts() {
        let goal = goal_with(0.0);
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY, 0.001] {
            let err = LedgerService::credit(&goal, amount, "Cash", date()).unwrap_err();
            assert!(matches!(err, SavingsError::InvalidAmount(_)), "{amount}");
        }
    }

    #[test]
    fn strict_debit_rejects_overdraw() {
        let goal = goal_with(100.0);
        let err =
            LedgerService::debit(&goal, 150.0, None, date(), WithdrawalPolicy::Strict).unwrap_err();
        match err {
            SavingsError::InsufficientBalance {
                requested,
                available,
            } => {
                assert_eq!(requested, 150.0);
                assert_eq!(available, 100.0);
            }
            other => panic!("expected insufficient balance, got {other:?}"),
        }
    }

    #[test]
    fn clamp_debit_records_effective_amount() {
        let goal = goal_with(100.0);
        let posting =
            LedgerService::debit(&goal, 150.0, Some("Car repair"), date(), WithdrawalPolicy::Clamp)
                .unwrap();
        assert_eq!(posting.goal.current(), 0.0);
        assert_eq!(posting.transaction.amount, -100.0);
        assert_eq!(posting.shortfall, 50.0);
        assert_eq!(posting.transaction.payment_method.as_deref(), Some(WITHDRAWAL_METHOD));
        assert_eq!(posting.transaction.kind.to_string(), "Car repair");
    }

    #[test]
    fn clamp_debit_on_empty_goal_is_rejected() {
        let goal = goal_with(0.0);
        let err =
            LedgerService::debit(&goal, 10.0, None, date(), WithdrawalPolicy::Clamp).unwrap_err();
        assert!(matches!(err, SavingsError::InsufficientBalance { .. }));
    }

    #[test]
    fn adjust_posts_the_difference() {
        let goal = goal_with(200.0);
        let posting = LedgerService::adjust(&goal, 150.0, date()).unwrap().unwrap();
        assert_eq!(posting.transaction.amount, -50.0);
        assert_eq!(posting.goal.current(), 150.0);
        assert!(LedgerService::adjust(&goal, 200.0, date()).unwrap().is_none());
        assert!(LedgerService::adjust(&goal, -1.0, date()).is_err());
    }

    #[test]
    fn replay_folds_seed_and_entries() {
        let goal = goal_with(10.0);
        let a = LedgerService::credit(&goal, 5.5, "", date()).unwrap();
        let b = LedgerService::debit(&a.goal, 2.25, None, date(), WithdrawalPolicy::Strict).unwrap();
        let total = LedgerService::replay(goal.seed_balance, [&a.transaction, &b.transaction]);
        assert_eq!(total, b.goal.current());
        assert_eq!(total, 13.25);
    }
}

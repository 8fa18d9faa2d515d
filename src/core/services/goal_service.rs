use chrono::{DateTime, Utc};

use crate::domain::{round_cents, Goal, GoalUpdate, NewGoal};
use crate::errors::{Result, SavingsError};

/// Validation and merge rules for goal records.
pub struct GoalService;

impl GoalService {
    pub fn build(draft: NewGoal, created_at: DateTime<Utc>) -> Result<Goal> {
        Self::validate_name(&draft.name)?;
        Self::validate_target(draft.target)?;
        Self::validate_contribution(draft.contribution_amount)?;
        let mut draft = draft;
        draft.target = round_cents(draft.target);
        draft.contribution_amount = round_cents(draft.contribution_amount);
        Ok(Goal::new(draft, created_at))
    }

    /// Applies every field of `changes` except `current` to a copy of `goal`.
    ///
    /// Balance changes go through the ledger; the caller posts those. Nothing
    /// is applied unless every supplied field is valid.
    pub fn merge(goal: &Goal, changes: &GoalUpdate) -> Result<Goal> {
        if let Some(name) = &changes.name {
            Self::validate_name(name)?;
        }
        if let Some(target) = changes.target {
            Self::validate_target(target)?;
        }
        if let Some(amount) = changes.contribution_amount {
            Self::validate_contribution(amount)?;
        }
        if let Some(current) = changes.current {
            Self::validate_balance(current)?;
        }

        let mut updated = goal.clone();
        if let Some(name) = &changes.name {
            updated.name = name.trim().to_string();
        }
        if let Some(deadline) = changes.deadline {
            updated.deadline = deadline;
        }
        if let Some(category) = changes.category {
            updated.category = category;
        }
        if let Some(frequency) = changes.frequency {
            updated.frequency = frequency;
        }
        if let Some(amount) = changes.contribution_amount {
            updated.contribution_amount = round_cents(amount);
        }
        if let Some(color) = &changes.color {
            updated.color = color.clone();
        }
        if let Some(photo) = &changes.photo {
            updated.photo = photo.clone();
        }
        if let Some(target) = changes.target {
            updated.set_target(round_cents(target));
        }
        Ok(updated)
    }

    /// Checks a goal read back from a snapshot against the same rules a
    /// freshly built goal obeys.
    pub fn check_stored(goal: &Goal) -> Result<()> {
        Self::validate_name(&goal.name)?;
        Self::validate_target(goal.target)?;
        Self::validate_contribution(goal.contribution_amount)?;
        Self::validate_balance(goal.current())?;
        if !goal.seed_balance.is_finite() {
            return Err(SavingsError::InvalidAmount(format!(
                "seed balance must be finite, got {}",
                goal.seed_balance
            )));
        }
        Ok(())
    }

    fn validate_balance(current: f64) -> Result<()> {
        if !current.is_finite() || current < 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "balance must be a non-negative number, got {}",
                current
            )));
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(SavingsError::Validation("Goal name cannot be empty".into()));
        }
        Ok(())
    }

    fn validate_target(target: f64) -> Result<()> {
        if !target.is_finite() || target <= 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "target must be a positive number, got {}",
                target
            )));
        }
        if round_cents(target) <= 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "target {} rounds to zero",
                target
            )));
        }
        Ok(())
    }

    fn validate_contribution(amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SavingsError::InvalidAmount(format!(
                "contribution must be zero or more, got {}",
                amount
            )));
        }
        Ok(())
    }
}

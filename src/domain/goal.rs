//! Savings goal entity and the request types used to create or patch one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Frequency, GoalCategory};

/// A named savings target with its current balance and contribution plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target: f64,
    current: f64,
    /// Opening balance the ledger folds on top of.
    #[serde(default)]
    pub seed_balance: f64,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub contribution_amount: f64,
    #[serde(default)]
    progress: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Builds a fresh goal with a zero balance.
    pub fn new(draft: NewGoal, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            target: draft.target,
            current: 0.0,
            seed_balance: 0.0,
            deadline: draft.deadline,
            category: draft.category,
            frequency: draft.frequency,
            contribution_amount: draft.contribution_amount,
            progress: 0,
            color: draft.color,
            photo: draft.photo,
            created_at,
        }
    }

    /// Builds a goal that starts with an existing balance and no ledger history.
    pub fn seeded(draft: NewGoal, seed_balance: f64, created_at: DateTime<Utc>) -> Self {
        let mut goal = Self::new(draft, created_at);
        goal.seed_balance = seed_balance;
        goal.set_current(seed_balance);
        goal
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Replaces the balance and recomputes progress in the same step.
    pub(crate) fn set_current(&mut self, current: f64) {
        self.current = round_cents(current.max(0.0));
        self.recalculate_progress();
    }

    /// Replaces the target and recomputes progress in the same step.
    pub(crate) fn set_target(&mut self, target: f64) {
        self.target = target;
        self.recalculate_progress();
    }

    pub(crate) fn recalculate_progress(&mut self) {
        self.progress = progress_for(self.current, self.target);
    }

    /// Goals at or beyond 100% are treated as complete, even when overfunded.
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    pub fn remaining(&self) -> f64 {
        round_cents((self.target - self.current).max(0.0))
    }
}

/// `round(100 * current / target)`; zero when the target is not positive.
pub fn progress_for(current: f64, target: f64) -> u32 {
    if !(target.is_finite() && target > 0.0) || !current.is_finite() {
        return 0;
    }
    let ratio = (current.max(0.0) / target) * 100.0;
    ratio.round() as u32
}

/// Rounds to two decimal places, the precision of every stored amount.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fields supplied when a goal is created. Balance and progress are never
/// caller-controlled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub target: f64,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub contribution_amount: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, target: f64, deadline: NaiveDate) -> Self {
        Self {
            name: name.into(),
            target,
            deadline,
            category: GoalCategory::default(),
            frequency: Frequency::default(),
            contribution_amount: 0.0,
            color: None,
            photo: None,
        }
    }

    pub fn with_category(mut self, category: GoalCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_contribution(mut self, amount: f64) -> Self {
        self.contribution_amount = amount;
        self
    }
}

/// Partial update; every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target: Option<f64>,
    pub current: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<GoalCategory>,
    pub frequency: Option<Frequency>,
    pub contribution_amount: Option<f64>,
    pub color: Option<Option<String>>,
    pub photo: Option<Option<String>>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        *self == GoalUpdate::default()
    }
}

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{round_cents, Goal, GoalCategory};

/// Share of the target that counts as on track. A fixed cut-off; no
/// deadline or contribution pace is taken into account.
pub const ON_TRACK_RATIO: f64 = 0.8;

/// Dashboard row for one goal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalOverview {
    pub id: Uuid,
    pub name: String,
    pub category: GoalCategory,
    pub current: f64,
    pub target: f64,
    pub progress: u32,
    pub days_left: i64,
    pub on_track: bool,
}

pub struct SummaryService;

impl SummaryService {
    pub fn total_saved<'a, I>(goals: I) -> f64
    where
        I: IntoIterator<Item = &'a Goal>,
    {
        round_cents(goals.into_iter().map(Goal::current).sum())
    }

    /// Calendar days until the deadline, never negative.
    pub fn days_left(goal: &Goal, today: NaiveDate) -> i64 {
        (goal.deadline - today).num_days().max(0)
    }

    pub fn is_on_track(goal: &Goal) -> bool {
        goal.current() >= goal.target * ON_TRACK_RATIO
    }

    pub fn overview(goal: &Goal, today: NaiveDate) -> GoalOverview {
        GoalOverview {
            id: goal.id,
            name: goal.name.clone(),
            category: goal.category,
            current: goal.current(),
            target: goal.target,
            progress: goal.progress(),
            days_left: Self::days_left(goal, today),
            on_track: Self::is_on_track(goal),
        }
    }

    pub fn overviews(goals: &[Goal], today: NaiveDate) -> Vec<GoalOverview> {
        goals.iter().map(|goal| Self::overview(goal, today)).collect()
    }
}

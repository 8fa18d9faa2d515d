//! Suggested periodic contribution for reaching a target by a date.

use chrono::NaiveDate;

use crate::domain::{Frequency, Goal};

pub struct ContributionService;

impl ContributionService {
    /// Amount to save each period so that `target` is reached by `target_date`.
    ///
    /// Returns 0 when there is no whole period left or when the target is not
    /// a positive finite number. The result is rounded up to a whole unit.
    pub fn suggested_contribution(
        target: f64,
        target_date: NaiveDate,
        frequency: Frequency,
        now: NaiveDate,
    ) -> f64 {
        if !target.is_finite() || target <= 0.0 {
            return 0.0;
        }
        let periods = frequency.whole_periods_between(now, target_date);
        if periods <= 0 {
            return 0.0;
        }
        (target / periods as f64).ceil()
    }

    /// Suggestion for what is still missing on an existing goal.
    pub fn suggestion_for(goal: &Goal, now: NaiveDate) -> f64 {
        Self::suggested_contribution(goal.remaining(), goal.deadline, goal.frequency, now)
    }

    /// Number of contribution periods left before the goal's deadline.
    pub fn periods_remaining(goal: &Goal, now: NaiveDate) -> i64 {
        goal.frequency.whole_periods_between(now, goal.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewGoal;
    use chrono::{Duration, Months, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    #[test]
    fn twelve_months_of_twelve_hundred_is_one_hundred() {
        let deadline = today().checked_add_months(Months::new(12)).unwrap();
        let amount =
            ContributionService::suggested_contribution(1200.0, deadline, Frequency::Monthly, today());
        assert_eq!(amount, 100.0);
    }

    #[test]
    fn past_deadline_yields_no_suggestion() {
        let deadline = today() - Duration::days(1);
        let amount =
            ContributionService::suggested_contribution(1000.0, deadline, Frequency::Monthly, today());
        assert_eq!(amount, 0.0);
    }

    #[test]
    fn invalid_targets_yield_no_suggestion() {
        let deadline = today() + Duration::days(400);
        for target in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let amount = ContributionService::suggested_contribution(
                target,
                deadline,
                Frequency::Weekly,
                today(),
            );
            assert_eq!(amount, 0.0, "{target}");
        }
    }

    #[test]
    fn rounds_up_to_whole_units_per_cadence() {
        let deadline = today() + Duration::weeks(3);
        assert_eq!(
            ContributionService::suggested_contribution(100.0, deadline, Frequency::Weekly, today()),
            34.0
        );

        let deadline = today().checked_add_months(Months::new(13)).unwrap();
        assert_eq!(
            ContributionService::suggested_contribution(
                9000.0,
                deadline,
                Frequency::HalfYearly,
                today()
            ),
            3000.0
        );
        assert_eq!(
            ContributionService::suggested_contribution(9000.0, deadline, Frequency::Yearly, today()),
            9000.0
        );
    }

    #[test]
    fn is_deterministic_for_identical_inputs() {
        let deadline = today() + Duration::days(200);
        let first =
            ContributionService::suggested_contribution(777.0, deadline, Frequency::Weekly, today());
        let second =
            ContributionService::suggested_contribution(777.0, deadline, Frequency::Weekly, today());
        assert_eq!(first, second);
    }

    #[test]
    fn suggestion_for_goal_uses_remaining_amount() {
        let deadline = today().checked_add_months(Months::new(10)).unwrap();
        let draft = NewGoal::new("Car", 25000.0, deadline);
        let goal = Goal::seeded(draft, 5000.0, Utc::now());
        assert_eq!(ContributionService::suggestion_for(&goal, today()), 2000.0);
        assert_eq!(ContributionService::periods_remaining(&goal, today()), 10);
    }
}

//! Cadence and category enums plus calendar helpers for savings primitives.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
/// Contribution cadence attached to a savings goal.
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    HalfYearly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::HalfYearly,
        Frequency::Yearly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::HalfYearly => "half-yearly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Returns the date `steps` periods after `from`.
    ///
    /// Month-based cadences clamp the day to the length of the target month,
    /// so Jan 31 + 1 month lands on the last day of February.
    pub fn advance(self, from: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => from.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => from.checked_add_months(Months::new(steps)),
            Frequency::HalfYearly => from.checked_add_months(Months::new(steps.checked_mul(6)?)),
            Frequency::Yearly => from.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }

    /// Counts whole cadence units between `from` and `to`.
    ///
    /// Half-yearly periods round partial half-years up; every other cadence
    /// counts only complete units. Returns 0 when `to` is not after `from`.
    pub fn whole_periods_between(self, from: NaiveDate, to: NaiveDate) -> i64 {
        if to <= from {
            return 0;
        }
        match self {
            Frequency::Weekly => (to - from).num_days() / 7,
            Frequency::Monthly => whole_months_between(from, to),
            Frequency::HalfYearly => {
                let months = whole_months_between(from, to);
                (months + 5) / 6
            }
            Frequency::Yearly => whole_months_between(from, to) / 12,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "half-yearly" | "half_yearly" | "halfyearly" | "semiannual" => {
                Ok(Frequency::HalfYearly)
            }
            "yearly" | "year" | "annual" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency `{}`", other)),
        }
    }
}

/// Largest `n` such that `from + n months` is not after `to`.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to <= from {
        return 0;
    }
    let years = (to.year() - from.year()) as i64;
    let mut months = years * 12 + to.month() as i64 - from.month() as i64;
    while months > 0 {
        match from.checked_add_months(Months::new(months as u32)) {
            Some(candidate) if candidate <= to => break,
            _ => months -= 1,
        }
    }
    months.max(0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
/// Enumerated tag used to group goals on the dashboard.
pub enum GoalCategory {
    Home,
    Travel,
    Car,
    Wedding,
    Education,
    Emergency,
    Gift,
    Birthday,
    #[default]
    Miscellaneous,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 9] = [
        GoalCategory::Home,
        GoalCategory::Travel,
        GoalCategory::Car,
        GoalCategory::Wedding,
        GoalCategory::Education,
        GoalCategory::Emergency,
        GoalCategory::Gift,
        GoalCategory::Birthday,
        GoalCategory::Miscellaneous,
    ];
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalCategory::Home => "Home",
            GoalCategory::Travel => "Travel",
            GoalCategory::Car => "Car",
            GoalCategory::Wedding => "Wedding",
            GoalCategory::Education => "Education",
            GoalCategory::Emergency => "Emergency",
            GoalCategory::Gift => "Gift",
            GoalCategory::Birthday => "Birthday",
            GoalCategory::Miscellaneous => "Miscellaneous",
        };
        f.write_str(label)
    }
}

impl FromStr for GoalCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        GoalCategory::ALL
            .into_iter()
            .find(|category| category.to_string().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown category `{}`", needle))
    }
}

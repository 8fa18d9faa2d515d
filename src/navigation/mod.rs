//! Screen state for the savings flow.
//!
//! Each screen that needs a goal carries its id, and [`Navigator::navigate`]
//! refuses ids the store does not know, so a screen never renders against a
//! missing goal.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::core::goal_store::GoalStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Banking,
    Goals,
    CreateGoal,
    GoalDetails { goal_id: Uuid },
    AddMoney { goal_id: Uuid },
    Withdraw { goal_id: Uuid },
    Reminders { goal_id: Uuid },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("unknown screen `{0}`")]
    UnknownScreen(String),
    #[error("screen `{0}` needs a goal")]
    MissingGoal(&'static str),
    #[error("no goal with id {0}")]
    UnknownGoal(Uuid),
}

impl Screen {
    pub const TOKENS: [&'static str; 7] = [
        "banking", "goals", "create", "details", "addmoney", "withdraw", "reminders",
    ];

    /// Parses a screen token such as `details` together with its goal, if any.
    pub fn from_token(token: &str, goal: Option<Uuid>) -> Result<Self, NavigationError> {
        let token = token.trim().to_ascii_lowercase();
        let needs_goal = |name: &'static str| goal.ok_or(NavigationError::MissingGoal(name));
        match token.as_str() {
            "banking" | "home" => Ok(Screen::Banking),
            "goals" | "dashboard" => Ok(Screen::Goals),
            "create" => Ok(Screen::CreateGoal),
            "details" => Ok(Screen::GoalDetails {
                goal_id: needs_goal("details")?,
            }),
            "addmoney" | "add" => Ok(Screen::AddMoney {
                goal_id: needs_goal("addmoney")?,
            }),
            "withdraw" => Ok(Screen::Withdraw {
                goal_id: needs_goal("withdraw")?,
            }),
            "reminders" => Ok(Screen::Reminders {
                goal_id: needs_goal("reminders")?,
            }),
            _ => Err(NavigationError::UnknownScreen(token)),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Screen::Banking => "banking",
            Screen::Goals => "goals",
            Screen::CreateGoal => "create",
            Screen::GoalDetails { .. } => "details",
            Screen::AddMoney { .. } => "addmoney",
            Screen::Withdraw { .. } => "withdraw",
            Screen::Reminders { .. } => "reminders",
        }
    }

    pub fn goal_id(&self) -> Option<Uuid> {
        match self {
            Screen::GoalDetails { goal_id }
            | Screen::AddMoney { goal_id }
            | Screen::Withdraw { goal_id }
            | Screen::Reminders { goal_id } => Some(*goal_id),
            _ => None,
        }
    }

    /// Screen that the back action returns to. `Banking` is the root.
    pub fn parent(&self) -> Option<Screen> {
        match *self {
            Screen::Banking => None,
            Screen::Goals => Some(Screen::Banking),
            Screen::CreateGoal | Screen::GoalDetails { .. } => Some(Screen::Goals),
            Screen::AddMoney { goal_id }
            | Screen::Withdraw { goal_id }
            | Screen::Reminders { goal_id } => Some(Screen::GoalDetails { goal_id }),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Screen::Banking => "Banking",
            Screen::Goals => "Savings Goals",
            Screen::CreateGoal => "Create Goal",
            Screen::GoalDetails { .. } => "Goal Details",
            Screen::AddMoney { .. } => "Add Money",
            Screen::Withdraw { .. } => "Withdraw",
            Screen::Reminders { .. } => "Reminders",
        };
        f.write_str(label)
    }
}

/// Most recent screens kept by [`Navigator::history`].
pub const HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Screen::Banking,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    pub fn navigate(&mut self, screen: Screen, store: &GoalStore) -> Result<Screen, NavigationError> {
        if let Some(id) = screen.goal_id() {
            if store.goal(id).is_none() {
                return Err(NavigationError::UnknownGoal(id));
            }
        }
        if screen != self.current {
            self.remember(self.current);
            self.current = screen;
        }
        tracing::debug!(screen = screen.token(), "navigated");
        Ok(self.current)
    }

    /// Moves to the parent of the current screen.
    pub fn back(&mut self) -> Screen {
        if let Some(parent) = self.current.parent() {
            self.remember(self.current);
            self.current = parent;
        }
        self.current
    }

    fn remember(&mut self, screen: Screen) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(screen);
    }

    /// Leaves screens that point at a goal which no longer exists.
    pub fn revalidate(&mut self, store: &GoalStore) -> Screen {
        let stale = |screen: &Screen| screen.goal_id().is_some_and(|id| store.goal(id).is_none());
        if stale(&self.current) {
            self.current = Screen::Goals;
        }
        self.history.retain(|screen| !stale(screen));
        self.current
    }
}

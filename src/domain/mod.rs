//! Pure domain models: goals, ledger transactions, and cadence enums.
//! No I/O and no storage.

pub mod common;
pub mod goal;
pub mod transaction;

pub use common::{Frequency, GoalCategory};
pub use goal::{progress_for, round_cents, Goal, GoalUpdate, NewGoal};
pub use transaction::{Transaction, TransactionKind};

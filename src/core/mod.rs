pub mod goal_store;
pub mod services;
pub mod time;

pub use goal_store::{default_dataset, GoalStore, Listener, LoadReport, StoreEvent};
pub use time::{Clock, FixedClock, SystemClock};

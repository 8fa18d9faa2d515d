#![doc(test(attr(deny(warnings))))]

//! Goal-based savings core: savings goals with a signed per-goal ledger,
//! contribution suggestions, and reminder scheduling behind a notifier seam.
//! State persists as JSON snapshots in a key-value store.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod navigation;
pub mod notifications;
pub mod storage;
pub mod utils;

pub use crate::core::{GoalStore, LoadReport, StoreEvent};
pub use crate::errors::{Result, SavingsError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("goal savings tracing initialized");
    });
}

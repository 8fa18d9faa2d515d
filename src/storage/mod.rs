pub mod json_backend;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{Goal, Transaction};
use crate::errors::{Result, SavingsError};

pub use json_backend::JsonFileStore;

/// Key holding the JSON array of goal records.
pub const GOALS_KEY: &str = "savings-goals";
/// Key holding the JSON array of ledger transactions, newest first.
pub const LEDGER_KEY: &str = "savings-ledger";

/// String-keyed snapshot storage. One JSON blob per key.
pub trait SnapshotStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Snapshot store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `key`, mostly for tests that start from a stored snapshot.
    pub fn with_entry(self, key: &str, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.into());
        }
        self
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SavingsError::PersistenceUnavailable("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SavingsError::PersistenceUnavailable("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn encode_goals(goals: &[Goal]) -> Result<String> {
    Ok(serde_json::to_string_pretty(goals)?)
}

pub fn decode_goals(raw: &str) -> Result<Vec<Goal>> {
    let mut goals: Vec<Goal> = serde_json::from_str(raw)?;
    for goal in &mut goals {
        goal.recalculate_progress();
    }
    Ok(goals)
}

pub fn encode_ledger(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string_pretty(transactions)?)
}

pub fn decode_ledger(raw: &str) -> Result<Vec<Transaction>> {
    Ok(serde_json::from_str(raw)?)
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use goal_savings::{
    core::{Clock, FixedClock, GoalStore},
    domain::{Frequency, GoalCategory, NewGoal},
    storage::{JsonFileStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// 15 Sep 2025, 10:00 UTC.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap()))
}

pub fn memory_store() -> GoalStore {
    GoalStore::new(Box::new(MemoryStore::new()), fixed_clock())
}

/// Store backed by JSON files in a fresh directory; returns the directory too.
pub fn file_store() -> (GoalStore, PathBuf) {
    let dir = temp_dir();
    (open_file_store(&dir), dir)
}

pub fn open_file_store(dir: &PathBuf) -> GoalStore {
    let snapshots = JsonFileStore::new(dir.clone()).expect("create json snapshot store");
    GoalStore::new(Box::new(snapshots), fixed_clock())
}

pub fn sample_goal(name: &str, target: f64) -> NewGoal {
    NewGoal::new(name, target, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        .with_category(GoalCategory::Home)
        .with_frequency(Frequency::Monthly)
        .with_contribution(100.0)
}

/// Small deterministic generator for randomized sequences.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Amount in cents between 0.01 and `max`.
    pub fn amount(&mut self, max: f64) -> f64 {
        let cents = (max * 100.0) as u32;
        f64::from(self.next_u32() % cents + 1) / 100.0
    }
}

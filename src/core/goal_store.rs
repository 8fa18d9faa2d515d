//! Owned state container for goals and their ledger.
//!
//! `GoalStore` is the single writer for goal balances. Every mutation is
//! computed on a copy, persisted through the [`SnapshotStore`], and only then
//! swapped in, so a failed call leaves both memory and snapshot untouched.
//! Listeners registered through [`GoalStore::subscribe`] see each committed
//! change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use uuid::Uuid;

use crate::core::services::{GoalService, LedgerService, Posting, WithdrawalPolicy};
use crate::core::time::Clock;
use crate::domain::{
    round_cents, Frequency, Goal, GoalCategory, GoalUpdate, NewGoal, Transaction, TransactionKind,
};
use crate::errors::{Result, SavingsError};
use crate::storage::{self, SnapshotStore, GOALS_KEY, LEDGER_KEY};

/// Change notification emitted after a mutation has been committed.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    GoalCreated(Uuid),
    GoalUpdated(Uuid),
    GoalDeleted(Uuid),
    TransactionPosted {
        goal_id: Uuid,
        transaction_id: Uuid,
        amount: f64,
    },
}

pub type Listener = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Outcome of [`GoalStore::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub goals: usize,
    pub transactions: usize,
    /// True when the built-in dataset replaced a missing or unreadable snapshot.
    pub used_defaults: bool,
    pub warnings: Vec<String>,
}

pub struct GoalStore {
    goals: Vec<Goal>,
    /// Newest first.
    ledger: Vec<Transaction>,
    storage: Box<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    policy: WithdrawalPolicy,
    listeners: Vec<Listener>,
}

impl GoalStore {
    /// Empty store; call [`GoalStore::load`] to read an existing snapshot.
    pub fn new(storage: Box<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            goals: Vec::new(),
            ledger: Vec::new(),
            storage,
            clock,
            policy: WithdrawalPolicy::default(),
            listeners: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: WithdrawalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> WithdrawalPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: WithdrawalPolicy) {
        self.policy = policy;
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Replaces in-memory state with the stored snapshot.
    ///
    /// A missing or malformed goals snapshot falls back to [`default_dataset`].
    /// Goal records that break the balance or target rules are dropped, as are
    /// ledger entries that point at unknown goals. Goals whose balance
    /// disagrees with their ledger get their seed balance reconciled. Only an
    /// unreadable store is an error.
    pub fn load(&mut self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let goals = match self.read_decoded(GOALS_KEY, storage::decode_goals)? {
            Some(Ok(goals)) => Some(goals),
            Some(Err(err)) => {
                report
                    .warnings
                    .push(format!("goal snapshot could not be parsed ({}); defaults loaded", err));
                None
            }
            None => None,
        };

        let (mut goals, mut ledger) = match goals {
            Some(goals) => {
                let ledger = match self.read_decoded(LEDGER_KEY, storage::decode_ledger)? {
                    Some(Ok(ledger)) => ledger,
                    Some(Err(err)) => {
                        report
                            .warnings
                            .push(format!("ledger snapshot could not be parsed ({}); history cleared", err));
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                (goals, ledger)
            }
            None => {
                report.used_defaults = true;
                default_dataset(self.clock.today(), self.clock.now())
            }
        };

        goals.retain(|goal| match GoalService::check_stored(goal) {
            Ok(()) => true,
            Err(err) => {
                report
                    .warnings
                    .push(format!("dropped invalid goal `{}` ({})", goal.name, err));
                false
            }
        });

        let known: HashMap<Uuid, usize> = goals
            .iter()
            .enumerate()
            .map(|(index, goal)| (goal.id, index))
            .collect();
        let before = ledger.len();
        ledger.retain(|txn| known.contains_key(&txn.goal_id));
        if ledger.len() != before {
            report.warnings.push(format!(
                "dropped {} transaction(s) referencing unknown goals",
                before - ledger.len()
            ));
        }
        ledger.sort_by(|a, b| b.date.cmp(&a.date));

        for goal in &mut goals {
            let folded =
                LedgerService::replay(goal.seed_balance, ledger.iter().filter(|t| t.goal_id == goal.id));
            if folded != goal.current() {
                let delta = goal.current() - folded;
                goal.seed_balance = round_cents(goal.seed_balance + delta);
                report.warnings.push(format!(
                    "goal `{}` balance disagreed with its ledger by {:.2}; seed balance reconciled",
                    goal.name, delta
                ));
            }
        }

        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        report.goals = goals.len();
        report.transactions = ledger.len();
        self.goals = goals;
        self.ledger = ledger;
        tracing::info!(goals = report.goals, transactions = report.transactions, "goal store loaded");
        Ok(report)
    }

    /// `Ok(None)` when the key is absent. Undecodable bytes and unparsable
    /// JSON both come back as `Some(Err(..))`.
    fn read_decoded<T>(&self, key: &str, decode: fn(&str) -> Result<T>) -> Result<Option<Result<T>>> {
        match self.storage.read(key) {
            Ok(Some(raw)) => Ok(Some(decode(&raw))),
            Ok(None) => Ok(None),
            Err(err @ SavingsError::MalformedSnapshot { .. }) => Ok(Some(Err(err))),
            Err(err) => Err(err),
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    /// Case-insensitive lookup by name or id prefix, as typed in the shell.
    pub fn find(&self, query: &str) -> Option<&Goal> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self.goal(id);
        }
        let lowered = query.to_lowercase();
        self.goals
            .iter()
            .find(|goal| goal.name.to_lowercase() == lowered)
            .or_else(|| {
                let mut matches = self
                    .goals
                    .iter()
                    .filter(|goal| goal.id.simple().to_string().starts_with(&lowered));
                match (matches.next(), matches.next()) {
                    (Some(goal), None) if lowered.len() >= 4 => Some(goal),
                    _ => None,
                }
            })
    }

    /// Every transaction, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger
    }

    pub fn transactions_for(&self, id: Uuid) -> Vec<&Transaction> {
        self.ledger.iter().filter(|txn| txn.goal_id == id).collect()
    }

    pub fn total_saved(&self) -> f64 {
        crate::core::services::SummaryService::total_saved(&self.goals)
    }

    pub fn create_goal(&mut self, draft: NewGoal) -> Result<Goal> {
        let goal = GoalService::build(draft, self.clock.now())?;
        let mut goals = self.goals.clone();
        goals.push(goal.clone());
        self.commit(goals, None, vec![StoreEvent::GoalCreated(goal.id)])?;
        tracing::info!(goal = %goal.name, id = %goal.id, "goal created");
        Ok(goal)
    }

    /// Merges `changes` into the goal. A new `current` is posted to the ledger
    /// as a balance adjustment.
    pub fn update_goal(&mut self, id: Uuid, changes: GoalUpdate) -> Result<Goal> {
        let index = self.index_of(id)?;
        let mut updated = GoalService::merge(&self.goals[index], &changes)?;
        let mut events = Vec::new();
        let mut ledger = None;
        if let Some(current) = changes.current {
            if let Some(posting) = LedgerService::adjust(&updated, current, self.clock.today())? {
                events.push(Self::posted(&posting));
                let mut entries = self.ledger.clone();
                entries.insert(0, posting.transaction);
                ledger = Some(entries);
                updated = posting.goal;
            }
        }
        events.insert(0, StoreEvent::GoalUpdated(id));
        let mut goals = self.goals.clone();
        goals[index] = updated.clone();
        self.commit(goals, ledger, events)?;
        tracing::debug!(id = %id, "goal updated");
        Ok(updated)
    }

    /// Removes the goal and its history. Returns `false` when the id is unknown.
    pub fn delete_goal(&mut self, id: Uuid) -> Result<bool> {
        let Some(index) = self.goals.iter().position(|goal| goal.id == id) else {
            tracing::debug!(id = %id, "delete ignored for unknown goal");
            return Ok(false);
        };
        let mut goals = self.goals.clone();
        let removed = goals.remove(index);
        let ledger: Vec<Transaction> = self
            .ledger
            .iter()
            .filter(|txn| txn.goal_id != id)
            .cloned()
            .collect();
        self.commit(goals, Some(ledger), vec![StoreEvent::GoalDeleted(id)])?;
        tracing::info!(goal = %removed.name, "goal deleted");
        Ok(true)
    }

    pub fn apply_credit(&mut self, id: Uuid, amount: f64, method: &str) -> Result<Posting> {
        let index = self.index_of(id)?;
        let posting = LedgerService::credit(&self.goals[index], amount, method, self.clock.today())?;
        self.commit_posting(index, &posting)?;
        tracing::info!(goal = %posting.goal.name, amount = posting.transaction.amount, "credit posted");
        Ok(posting)
    }

    /// Withdraws under the store's [`WithdrawalPolicy`].
    pub fn apply_debit(&mut self, id: Uuid, amount: f64, reason: Option<&str>) -> Result<Posting> {
        let index = self.index_of(id)?;
        let posting = LedgerService::debit(
            &self.goals[index],
            amount,
            reason,
            self.clock.today(),
            self.policy,
        )?;
        self.commit_posting(index, &posting)?;
        if posting.shortfall > 0.0 {
            tracing::warn!(
                goal = %posting.goal.name,
                requested = amount,
                shortfall = posting.shortfall,
                "withdrawal clamped to available balance"
            );
        } else {
            tracing::info!(goal = %posting.goal.name, amount = posting.transaction.amount, "debit posted");
        }
        Ok(posting)
    }

    fn commit_posting(&mut self, index: usize, posting: &Posting) -> Result<()> {
        let mut goals = self.goals.clone();
        goals[index] = posting.goal.clone();
        let mut ledger = self.ledger.clone();
        ledger.insert(0, posting.transaction.clone());
        let events = vec![
            StoreEvent::GoalUpdated(posting.goal.id),
            Self::posted(posting),
        ];
        self.commit(goals, Some(ledger), events)
    }

    fn posted(posting: &Posting) -> StoreEvent {
        StoreEvent::TransactionPosted {
            goal_id: posting.goal.id,
            transaction_id: posting.transaction.id,
            amount: posting.transaction.amount,
        }
    }

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or(SavingsError::NotFound(id))
    }

    /// Persists the candidate state, then swaps it in and notifies listeners.
    ///
    /// The ledger is written before the goals. When the goals write fails the
    /// previous ledger is written back, so the snapshot pair matches what is
    /// still held in memory.
    fn commit(
        &mut self,
        goals: Vec<Goal>,
        ledger: Option<Vec<Transaction>>,
        events: Vec<StoreEvent>,
    ) -> Result<()> {
        let goals_json = storage::encode_goals(&goals)?;
        let previous_ledger = storage::encode_ledger(&self.ledger)?;
        let ledger_json = match &ledger {
            Some(entries) => storage::encode_ledger(entries)?,
            None => previous_ledger.clone(),
        };

        self.storage.write(LEDGER_KEY, &ledger_json)?;
        if let Err(err) = self.storage.write(GOALS_KEY, &goals_json) {
            if ledger.is_some() {
                if let Err(restore) = self.storage.write(LEDGER_KEY, &previous_ledger) {
                    tracing::error!(error = %restore, "ledger snapshot not restored after failed goal write");
                }
            }
            return Err(err);
        }

        self.goals = goals;
        if let Some(ledger) = ledger {
            self.ledger = ledger;
        }
        for event in &events {
            for listener in &self.listeners {
                listener(event);
            }
        }
        Ok(())
    }
}

/// Built-in dataset used when no snapshot exists: three goals, with recent
/// history on the emergency fund. Seed balances are set so every goal folds
/// to its current balance.
pub fn default_dataset(today: NaiveDate, now: DateTime<Utc>) -> (Vec<Goal>, Vec<Transaction>) {
    let mut goals = default_goals(today, now);
    let mut ledger = Vec::new();
    if let Some(fund) = goals.first_mut() {
        let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        let history = [
            (today, 300.0, TransactionKind::AutoSave),
            (today - Duration::days(5), 50.0, TransactionKind::ManualAdd),
            (month_ago, 300.0, TransactionKind::AutoSave),
            (month_ago - Duration::days(10), 100.0, TransactionKind::BonusAdd),
        ];
        for (date, amount, kind) in history {
            ledger.push(Transaction::new(fund.id, date, amount, kind));
        }
        let posted: f64 = ledger.iter().map(|txn| txn.amount).sum();
        fund.seed_balance = round_cents(fund.current() - posted);
    }
    (goals, ledger)
}

fn default_goals(today: NaiveDate, now: DateTime<Utc>) -> Vec<Goal> {
    let months_ahead = |months: u32| today.checked_add_months(Months::new(months)).unwrap_or(today);
    let seeds = [
        ("Emergency Fund", 5000.0, 3250.0, GoalCategory::Emergency, 500.0, 12),
        ("Dream Vacation", 8000.0, 2100.0, GoalCategory::Travel, 400.0, 8),
        ("New Car", 25000.0, 8500.0, GoalCategory::Car, 800.0, 24),
    ];
    seeds
        .into_iter()
        .map(|(name, target, current, category, contribution, months)| {
            let draft = NewGoal::new(name, target, months_ahead(months))
                .with_category(category)
                .with_frequency(Frequency::Monthly)
                .with_contribution(contribution);
            Goal::seeded(draft, current, now)
        })
        .collect()
}

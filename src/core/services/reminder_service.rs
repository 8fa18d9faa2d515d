//! Reminder planning and hand-off to the notification collaborator.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::time::Clock;
use crate::domain::{round_cents, Frequency};
use crate::errors::{Result, SavingsError};
use crate::notifications::{
    DeliveryError, Notification, NotificationId, NotificationMetadata, Notifier, Permission,
    ReminderCadence, TransferDirection,
};
use crate::utils::format::format_amount;

/// Number of future reminders queued for a recurring plan.
pub const DEFAULT_REMINDER_COUNT: u32 = 12;

/// One future reminder instance, ready to be handed to a [`Notifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderOccurrence {
    pub title: String,
    pub body: String,
    pub scheduled_at: DateTime<Utc>,
    pub metadata: NotificationMetadata,
}

impl ReminderOccurrence {
    pub fn into_notification(self) -> Notification {
        Notification {
            id: NotificationId::new(),
            title: self.title,
            body: self.body,
            scheduled_at: self.scheduled_at,
            metadata: self.metadata,
        }
    }
}

/// Builds `count` reminders, the `i`-th one `i` periods after `start`.
///
/// Monthly steps keep the time of day and clamp the day to the month length.
pub fn schedule_occurrences(
    start: DateTime<Utc>,
    cadence: ReminderCadence,
    count: u32,
    amount: f64,
    goal_name: &str,
    currency: &str,
) -> Vec<ReminderOccurrence> {
    let frequency = match cadence {
        ReminderCadence::Weekly => Frequency::Weekly,
        ReminderCadence::Monthly => Frequency::Monthly,
    };
    let time = start.time();
    let date = start.date_naive();
    (1..=count)
        .map_while(|index| {
            let day = frequency.advance(date, index)?;
            Some((index, day.and_time(time).and_utc()))
        })
        .map(|(index, scheduled_at)| ReminderOccurrence {
            title: "Regular Savings Reminder".into(),
            body: format!(
                "Time for your {} {} contribution to {}!",
                cadence,
                format_amount(amount, currency),
                goal_name
            ),
            scheduled_at,
            metadata: NotificationMetadata::RecurringReminder {
                goal_name: goal_name.to_string(),
                amount,
                cadence,
                occurrence: index,
            },
        })
        .collect()
}

/// Outcome of handing notifications to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Scheduled(usize),
    Partial {
        scheduled: usize,
        failed: usize,
        reason: String,
    },
    Unavailable {
        reason: String,
    },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Scheduled(_))
    }
}

/// Outcome of [`ReminderService::cancel_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(usize),
    Partial { cancelled: usize, failed: usize },
    Unavailable { reason: String },
}

/// Weekly/monthly toggles chosen on the reminder settings screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderSettings {
    pub weekly: bool,
    pub monthly: bool,
    /// Monthly contribution; weekly reminders ask for a quarter of it.
    pub amount: f64,
}

impl ReminderSettings {
    pub fn weekly_amount(&self) -> f64 {
        round_cents(self.amount / 4.0)
    }
}

pub struct ReminderService {
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
    currency: String,
    count: u32,
    permission: Option<Permission>,
}

impl ReminderService {
    pub fn new(notifier: Box<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifier,
            clock,
            currency: "KD".into(),
            count: DEFAULT_REMINDER_COUNT,
            permission: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    /// Asks the collaborator for permission once and remembers the answer.
    /// A failed request is not remembered.
    pub fn initialize(&mut self) -> std::result::Result<Permission, DeliveryError> {
        if let Some(permission) = self.permission {
            return Ok(permission);
        }
        let answer = self.notifier.request_permission().map_err(|err| {
            tracing::warn!(error = %err, "notification permission request failed");
            err
        })?;
        self.permission = Some(answer);
        Ok(answer)
    }

    /// Queues the next `count` reminders for a recurring contribution.
    pub fn schedule_recurring(
        &mut self,
        goal_name: &str,
        amount: f64,
        cadence: ReminderCadence,
    ) -> DeliveryOutcome {
        let occurrences = schedule_occurrences(
            self.clock.now(),
            cadence,
            self.count,
            amount,
            goal_name,
            &self.currency,
        );
        let notifications: Vec<Notification> = occurrences
            .into_iter()
            .map(ReminderOccurrence::into_notification)
            .collect();
        let outcome = self.deliver(&notifications);
        if outcome.is_delivered() {
            tracing::info!(goal = goal_name, %cadence, count = notifications.len(), "scheduled recurring reminders");
        }
        outcome
    }

    /// Queues a single reminder at `at`.
    pub fn schedule_payment_reminder(
        &mut self,
        goal_name: &str,
        amount: f64,
        at: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let notification = Notification {
            id: NotificationId::new(),
            title: "Goal Payment Reminder".into(),
            body: format!(
                "Time to add {} to your {} goal!",
                format_amount(amount, &self.currency),
                goal_name
            ),
            scheduled_at: at,
            metadata: NotificationMetadata::Reminder {
                goal_name: goal_name.to_string(),
                amount,
            },
        };
        self.deliver(std::slice::from_ref(&notification))
    }

    /// Announces a credit or debit that the store has already committed.
    pub fn notify_transaction(
        &mut self,
        direction: TransferDirection,
        amount: f64,
        goal_name: &str,
    ) -> DeliveryOutcome {
        let money = format_amount(amount.abs(), &self.currency);
        let (title, body) = match direction {
            TransferDirection::Credit => ("Money Added!", format!("+{} added to {}", money, goal_name)),
            TransferDirection::Debit => (
                "Money Withdrawn",
                format!("-{} withdrawn from {}", money, goal_name),
            ),
        };
        let notification = Notification {
            id: NotificationId::new(),
            title: title.into(),
            body,
            scheduled_at: self.clock.now() + Duration::seconds(1),
            metadata: NotificationMetadata::Transaction {
                direction,
                amount: amount.abs(),
                goal_name: goal_name.to_string(),
            },
        };
        self.deliver(std::slice::from_ref(&notification))
    }

    /// Schedules the cadences enabled in `settings`.
    pub fn apply_settings(
        &mut self,
        goal_name: &str,
        settings: &ReminderSettings,
    ) -> Vec<(ReminderCadence, DeliveryOutcome)> {
        let mut outcomes = Vec::new();
        if settings.weekly {
            let outcome =
                self.schedule_recurring(goal_name, settings.weekly_amount(), ReminderCadence::Weekly);
            outcomes.push((ReminderCadence::Weekly, outcome));
        }
        if settings.monthly {
            let outcome =
                self.schedule_recurring(goal_name, settings.amount, ReminderCadence::Monthly);
            outcomes.push((ReminderCadence::Monthly, outcome));
        }
        outcomes
    }

    pub fn pending(&self) -> Result<Vec<Notification>> {
        self.notifier
            .list_pending()
            .map_err(|err| SavingsError::DeliveryUnavailable(err.to_string()))
    }

    /// Cancels every pending notification, one id at a time so that partial
    /// failures can be counted.
    pub fn cancel_all(&mut self) -> CancelOutcome {
        let pending = match self.notifier.list_pending() {
            Ok(pending) => pending,
            Err(err) => {
                tracing::warn!(error = %err, "unable to list pending notifications");
                return CancelOutcome::Unavailable {
                    reason: err.to_string(),
                };
            }
        };
        let mut cancelled = 0usize;
        let mut failed = 0usize;
        for notification in &pending {
            match self.notifier.cancel(&[notification.id]) {
                Ok(()) => cancelled += 1,
                Err(err) => {
                    tracing::warn!(id = %notification.id, error = %err, "failed to cancel notification");
                    failed += 1;
                }
            }
        }
        if failed == 0 {
            CancelOutcome::Cancelled(cancelled)
        } else {
            CancelOutcome::Partial { cancelled, failed }
        }
    }

    fn ensure_permission(&mut self) -> std::result::Result<(), String> {
        match self.initialize() {
            Ok(Permission::Granted) => Ok(()),
            Ok(Permission::Denied) => Err(DeliveryError::PermissionDenied.to_string()),
            Err(err) => Err(err.to_string()),
        }
    }

    fn deliver(&mut self, notifications: &[Notification]) -> DeliveryOutcome {
        if let Err(reason) = self.ensure_permission() {
            return DeliveryOutcome::Unavailable { reason };
        }
        let mut scheduled = 0usize;
        let mut last_error = None;
        for notification in notifications {
            match self.notifier.schedule(notification) {
                Ok(()) => scheduled += 1,
                Err(err) => {
                    tracing::warn!(error = %err, title = %notification.title, "notification not scheduled");
                    last_error = Some(err.to_string());
                }
            }
        }
        match last_error {
            None => DeliveryOutcome::Scheduled(scheduled),
            Some(reason) if scheduled == 0 => DeliveryOutcome::Unavailable { reason },
            Some(reason) => DeliveryOutcome::Partial {
                scheduled,
                failed: notifications.len() - scheduled,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::notifications::{LocalNotifier, UnsupportedNotifier};
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0).unwrap()
    }

    fn service(notifier: Box<dyn Notifier>) -> ReminderService {
        ReminderService::new(notifier, Arc::new(FixedClock(start())))
    }

    #[test]
    fn weekly_occurrences_are_seven_days_apart() {
        let now = start();
        let occurrences =
            schedule_occurrences(now, ReminderCadence::Weekly, 12, 50.0, "Emergency Fund", "KD");
        assert_eq!(occurrences.len(), 12);
        assert!(occurrences.iter().all(|item| item.scheduled_at > now));
        assert_eq!(occurrences[0].scheduled_at - now, Duration::days(7));
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1].scheduled_at - pair[0].scheduled_at, Duration::days(7));
        }
        assert_eq!(
            occurrences[0].body,
            "Time for your weekly KD 50 contribution to Emergency Fund!"
        );
    }

    #[test]
    fn monthly_occurrences_keep_time_and_clamp_day() {
        let occurrences =
            schedule_occurrences(start(), ReminderCadence::Monthly, 3, 300.0, "Car", "KD");
        let expected = [
            Utc.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 30, 9, 0, 0).unwrap(),
        ];
        let actual: Vec<_> = occurrences.iter().map(|item| item.scheduled_at).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn recurring_plan_lands_in_pending_queue() {
        let mut reminders = service(Box::new(LocalNotifier::new()));
        let outcome = reminders.schedule_recurring("Vacation", 400.0, ReminderCadence::Monthly);
        assert_eq!(outcome, DeliveryOutcome::Scheduled(12));
        assert_eq!(reminders.pending().unwrap().len(), 12);
    }

    #[test]
    fn initialize_reports_the_permission_answer() {
        let mut granted = service(Box::new(LocalNotifier::new()));
        assert_eq!(granted.initialize(), Ok(Permission::Granted));
        assert_eq!(granted.initialize(), Ok(Permission::Granted));

        let mut unsupported = service(Box::new(UnsupportedNotifier));
        assert_eq!(unsupported.initialize(), Err(DeliveryError::Unsupported));
    }

    #[test]
    fn unsupported_platform_is_reported_not_raised() {
        let mut reminders = service(Box::new(UnsupportedNotifier));
        let outcome = reminders.schedule_recurring("Vacation", 400.0, ReminderCadence::Weekly);
        assert!(matches!(outcome, DeliveryOutcome::Unavailable { .. }));
        assert!(matches!(
            reminders.cancel_all(),
            CancelOutcome::Unavailable { .. }
        ));
        assert!(matches!(
            reminders.pending(),
            Err(SavingsError::DeliveryUnavailable(_))
        ));
    }

    #[test]
    fn denied_permission_blocks_delivery() {
        let mut reminders = service(Box::new(LocalNotifier::with_permission(Permission::Denied)));
        assert_eq!(reminders.initialize(), Ok(Permission::Denied));
        let outcome = reminders.notify_transaction(TransferDirection::Credit, 50.0, "Car");
        assert!(matches!(outcome, DeliveryOutcome::Unavailable { .. }));
    }

    #[test]
    fn settings_schedule_weekly_quarter_and_monthly_amounts() {
        let mut reminders = service(Box::new(LocalNotifier::new())).with_count(2);
        let settings = ReminderSettings {
            weekly: true,
            monthly: true,
            amount: 300.0,
        };
        let outcomes = reminders.apply_settings("Emergency Fund", &settings);
        assert_eq!(outcomes.len(), 2);
        let pending = reminders.pending().unwrap();
        assert_eq!(pending.len(), 4);
        let weekly_amounts: Vec<f64> = pending
            .iter()
            .filter_map(|item| match &item.metadata {
                NotificationMetadata::RecurringReminder {
                    cadence: ReminderCadence::Weekly,
                    amount,
                    ..
                } => Some(*amount),
                _ => None,
            })
            .collect();
        assert_eq!(weekly_amounts, vec![75.0, 75.0]);
    }

    #[test]
    fn transaction_notice_is_due_right_away() {
        let mut reminders = service(Box::new(LocalNotifier::new()));
        reminders.notify_transaction(TransferDirection::Debit, -100.0, "Car");
        let pending = reminders.pending().unwrap();
        assert_eq!(pending[0].title, "Money Withdrawn");
        assert_eq!(pending[0].body, "-KD 100 withdrawn from Car");
        assert_eq!(pending[0].scheduled_at, start() + Duration::seconds(1));
    }

    /// Refuses to cancel a fixed set of ids.
    struct StubbornNotifier {
        inner: LocalNotifier,
        stuck: Mutex<HashSet<NotificationId>>,
    }

    impl Notifier for StubbornNotifier {
        fn request_permission(&self) -> std::result::Result<Permission, DeliveryError> {
            Ok(Permission::Granted)
        }

        fn schedule(&self, notification: &Notification) -> std::result::Result<(), DeliveryError> {
            let mut stuck = self.stuck.lock().unwrap();
            if stuck.is_empty() {
                stuck.insert(notification.id);
            }
            self.inner.schedule(notification)
        }

        fn cancel(&self, ids: &[NotificationId]) -> std::result::Result<(), DeliveryError> {
            if ids.iter().any(|id| self.stuck.lock().unwrap().contains(id)) {
                return Err(DeliveryError::Failed("busy".into()));
            }
            self.inner.cancel(ids)
        }

        fn list_pending(&self) -> std::result::Result<Vec<Notification>, DeliveryError> {
            self.inner.list_pending()
        }
    }

    /// Fails every other schedule call.
    struct FlakyNotifier {
        inner: LocalNotifier,
        calls: Mutex<usize>,
    }

    impl Notifier for FlakyNotifier {
        fn request_permission(&self) -> std::result::Result<Permission, DeliveryError> {
            Ok(Permission::Granted)
        }

        fn schedule(&self, notification: &Notification) -> std::result::Result<(), DeliveryError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls % 2 == 0 {
                return Err(DeliveryError::Failed("queue full".into()));
            }
            self.inner.schedule(notification)
        }

        fn cancel(&self, ids: &[NotificationId]) -> std::result::Result<(), DeliveryError> {
            self.inner.cancel(ids)
        }

        fn list_pending(&self) -> std::result::Result<Vec<Notification>, DeliveryError> {
            self.inner.list_pending()
        }
    }

    #[test]
    fn recurring_plan_reports_partial_delivery() {
        let notifier = FlakyNotifier {
            inner: LocalNotifier::new(),
            calls: Mutex::new(0),
        };
        let mut reminders = service(Box::new(notifier)).with_count(5);
        let outcome = reminders.schedule_recurring("Car", 10.0, ReminderCadence::Weekly);
        assert_eq!(
            outcome,
            DeliveryOutcome::Partial {
                scheduled: 3,
                failed: 2,
                reason: "notification service error: queue full".into(),
            }
        );
        assert!(!outcome.is_delivered());
        assert_eq!(reminders.pending().unwrap().len(), 3);
    }

    #[test]
    fn cancel_all_reports_partial_success() {
        let notifier = StubbornNotifier {
            inner: LocalNotifier::new(),
            stuck: Mutex::new(HashSet::new()),
        };
        let mut reminders = service(Box::new(notifier)).with_count(3);
        reminders.schedule_recurring("Car", 10.0, ReminderCadence::Weekly);
        assert_eq!(
            reminders.cancel_all(),
            CancelOutcome::Partial {
                cancelled: 2,
                failed: 1
            }
        );
        assert_eq!(reminders.pending().unwrap().len(), 1);
    }

    #[test]
    fn cancel_all_clears_local_queue() {
        let mut reminders = service(Box::new(LocalNotifier::new())).with_count(4);
        reminders.schedule_recurring("Car", 10.0, ReminderCadence::Monthly);
        assert_eq!(reminders.cancel_all(), CancelOutcome::Cancelled(4));
        assert!(reminders.pending().unwrap().is_empty());
    }
}

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::fixed_clock;
use goal_savings::{
    core::services::{
        schedule_occurrences, CancelOutcome, DeliveryOutcome, ReminderService, ReminderSettings,
    },
    notifications::{
        LocalNotifier, NotificationMetadata, Permission, ReminderCadence, UnsupportedNotifier,
    },
};

#[test]
fn weekly_plan_is_twelve_reminders_a_week_apart() {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap();
    let plan = schedule_occurrences(now, ReminderCadence::Weekly, 12, 50.0, "New Car", "KD");
    assert_eq!(plan.len(), 12);
    assert!(plan.iter().all(|occurrence| occurrence.scheduled_at > now));
    assert_eq!(plan[0].scheduled_at, now + Duration::days(7));
    for pair in plan.windows(2) {
        assert_eq!(pair[1].scheduled_at - pair[0].scheduled_at, Duration::days(7));
    }
    assert_eq!(plan[0].body, "Time for your weekly KD 50 contribution to New Car!");
}

#[test]
fn monthly_plan_keeps_time_of_day() {
    let now = Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap();
    let plan = schedule_occurrences(now, ReminderCadence::Monthly, 3, 500.0, "Trip", "KD");
    let dates: Vec<_> = plan
        .iter()
        .map(|occurrence| occurrence.scheduled_at.to_rfc3339())
        .collect();
    assert_eq!(
        dates,
        vec![
            "2025-10-15T10:00:00+00:00",
            "2025-11-15T10:00:00+00:00",
            "2025-12-15T10:00:00+00:00",
        ]
    );
}

#[test]
fn settings_schedule_both_cadences() {
    let mut service = ReminderService::new(Box::new(LocalNotifier::new()), fixed_clock());
    let settings = ReminderSettings {
        weekly: true,
        monthly: true,
        amount: 500.0,
    };
    let outcomes = service.apply_settings("Emergency Fund", &settings);
    assert_eq!(
        outcomes,
        vec![
            (ReminderCadence::Weekly, DeliveryOutcome::Scheduled(12)),
            (ReminderCadence::Monthly, DeliveryOutcome::Scheduled(12)),
        ]
    );

    let pending = service.pending().unwrap();
    assert_eq!(pending.len(), 24);
    let weekly_amounts: Vec<f64> = pending
        .iter()
        .filter_map(|notification| match &notification.metadata {
            NotificationMetadata::RecurringReminder {
                cadence: ReminderCadence::Weekly,
                amount,
                ..
            } => Some(*amount),
            _ => None,
        })
        .collect();
    assert_eq!(weekly_amounts.len(), 12);
    assert!(weekly_amounts.iter().all(|amount| *amount == 125.0));

    assert_eq!(service.cancel_all(), CancelOutcome::Cancelled(24));
    assert!(service.pending().unwrap().is_empty());
}

#[test]
fn missing_capability_is_reported_not_raised() {
    let mut unsupported = ReminderService::new(Box::new(UnsupportedNotifier), fixed_clock());
    let outcome = unsupported.schedule_recurring("Trip", 100.0, ReminderCadence::Monthly);
    assert!(matches!(outcome, DeliveryOutcome::Unavailable { .. }));
    assert!(matches!(unsupported.cancel_all(), CancelOutcome::Unavailable { .. }));

    let mut denied = ReminderService::new(
        Box::new(LocalNotifier::with_permission(Permission::Denied)),
        fixed_clock(),
    );
    assert_eq!(denied.initialize(), Ok(Permission::Denied));
    let outcome = denied.schedule_payment_reminder(
        "Trip",
        100.0,
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
    );
    assert!(matches!(outcome, DeliveryOutcome::Unavailable { .. }));
    assert!(denied.pending().unwrap().is_empty());
}

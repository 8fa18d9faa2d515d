//! Narrow seam to the device notification service.
//!
//! The savings core never talks to a platform runtime directly. Everything it
//! needs goes through [`Notifier`], and any failure there is reported back as
//! a value rather than propagated into the goal store.

mod local;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use local::{LocalNotifier, UnsupportedNotifier};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut short = self.0.simple().to_string();
        short.truncate(8);
        f.write_str(&short)
    }
}

/// Reminder cadences supported by the device scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCadence {
    Weekly,
    Monthly,
}

impl fmt::Display for ReminderCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderCadence::Weekly => f.write_str("weekly"),
            ReminderCadence::Monthly => f.write_str("monthly"),
        }
    }
}

impl std::str::FromStr for ReminderCadence {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(ReminderCadence::Weekly),
            "monthly" => Ok(ReminderCadence::Monthly),
            other => Err(format!(
                "unsupported reminder cadence `{}` (use weekly or monthly)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Credit,
    Debit,
}

/// Structured payload carried alongside the visible notification text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationMetadata {
    Transaction {
        direction: TransferDirection,
        amount: f64,
        goal_name: String,
    },
    Reminder {
        goal_name: String,
        amount: f64,
    },
    RecurringReminder {
        goal_name: String,
        amount: f64,
        cadence: ReminderCadence,
        occurrence: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,
    pub scheduled_at: DateTime<Utc>,
    pub metadata: NotificationMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("notifications are not supported on this platform")]
    Unsupported,
    #[error("notification permission denied")]
    PermissionDenied,
    #[error("notification service error: {0}")]
    Failed(String),
}

/// Device notification collaborator.
pub trait Notifier: Send + Sync {
    fn request_permission(&self) -> Result<Permission, DeliveryError>;
    fn schedule(&self, notification: &Notification) -> Result<(), DeliveryError>;
    fn cancel(&self, ids: &[NotificationId]) -> Result<(), DeliveryError>;
    fn list_pending(&self) -> Result<Vec<Notification>, DeliveryError>;
}

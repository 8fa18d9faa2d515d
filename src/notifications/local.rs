use std::sync::Mutex;

use super::{DeliveryError, Notification, NotificationId, Notifier, Permission};

/// In-process stand-in for a device scheduler: notifications sit in a
/// pending queue until cancelled.
#[derive(Debug)]
pub struct LocalNotifier {
    permission: Permission,
    pending: Mutex<Vec<Notification>>,
}

impl LocalNotifier {
    pub fn new() -> Self {
        Self::with_permission(Permission::Granted)
    }

    pub fn with_permission(permission: Permission) -> Self {
        Self {
            permission,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn queue(&self) -> Result<std::sync::MutexGuard<'_, Vec<Notification>>, DeliveryError> {
        self.pending
            .lock()
            .map_err(|_| DeliveryError::Failed("pending queue poisoned".into()))
    }
}

impl Default for LocalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for LocalNotifier {
    fn request_permission(&self) -> Result<Permission, DeliveryError> {
        Ok(self.permission)
    }

    fn schedule(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.permission == Permission::Denied {
            return Err(DeliveryError::PermissionDenied);
        }
        let mut queue = self.queue()?;
        queue.retain(|existing| existing.id != notification.id);
        queue.push(notification.clone());
        queue.sort_by_key(|item| item.scheduled_at);
        Ok(())
    }

    fn cancel(&self, ids: &[NotificationId]) -> Result<(), DeliveryError> {
        let mut queue = self.queue()?;
        queue.retain(|item| !ids.contains(&item.id));
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<Notification>, DeliveryError> {
        Ok(self.queue()?.clone())
    }
}

/// Notifier for hosts without a notification runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedNotifier;

impl Notifier for UnsupportedNotifier {
    fn request_permission(&self) -> Result<Permission, DeliveryError> {
        Err(DeliveryError::Unsupported)
    }

    fn schedule(&self, _notification: &Notification) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unsupported)
    }

    fn cancel(&self, _ids: &[NotificationId]) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unsupported)
    }

    fn list_pending(&self) -> Result<Vec<Notification>, DeliveryError> {
        Err(DeliveryError::Unsupported)
    }
}

//! Non-owning handle used by components that emit notifications.

use std::sync::{Arc, Weak};

use crate::center::{Inner, NotificationCenter};
use crate::error::NotificationError;
use crate::notification::{Notification, NotificationId, Severity};

/// Weak handle to a [`NotificationCenter`].
///
/// Every operation fails with [`NotificationError::OutsideProvider`] once the
/// center it was taken from has been dropped.
#[derive(Clone)]
pub struct NotificationContext {
    center: Weak<Inner>,
    /// Keeps a hub from evicting the center while this context lives
    _pin: Option<Arc<()>>,
}

impl NotificationContext {
    pub(crate) fn new(center: Weak<Inner>, pin: Arc<()>) -> Self {
        Self {
            center,
            _pin: Some(pin),
        }
    }

    /// A context that was never attached to a center.
    pub fn detached() -> Self {
        Self {
            center: Weak::new(),
            _pin: None,
        }
    }

    fn center(&self) -> Result<NotificationCenter, NotificationError> {
        self.center
            .upgrade()
            .map(NotificationCenter::from_inner)
            .ok_or(NotificationError::OutsideProvider)
    }

    pub fn is_attached(&self) -> bool {
        self.center.strong_count() > 0
    }

    pub fn notify(
        &self,
        message: impl Into<String>,
        severity: Severity,
    ) -> Result<NotificationId, NotificationError> {
        Ok(self.center()?.notify(message, severity))
    }

    pub fn success(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.notify(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.notify(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.notify(message, Severity::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<NotificationId, NotificationError> {
        self.notify(message, Severity::Info)
    }

    pub fn dismiss(&self, id: NotificationId) -> Result<bool, NotificationError> {
        Ok(self.center()?.dismiss(id))
    }

    pub fn snapshot(&self) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.center()?.snapshot())
    }

    /// Whether both contexts point at the same center.
    pub fn same_center(&self, other: &NotificationContext) -> bool {
        Weak::ptr_eq(&self.center, &other.center)
    }
}

impl From<&NotificationCenter> for NotificationContext {
    fn from(center: &NotificationCenter) -> Self {
        center.context()
    }
}

impl std::fmt::Debug for NotificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationContext")
            .field("attached", &self.is_attached())
            .finish()
    }
}

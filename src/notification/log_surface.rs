//! Fallback surface that writes notifications to the log.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::NotificationError;
use super::{NotificationContent, NotificationId, NotificationSurface, PermissionStatus, ResponseListener};

#[derive(Default)]
pub struct LogSurface {
    next_id: AtomicU64,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSurface for LogSurface {
    fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
        Ok(PermissionStatus::Granted)
    }

    fn set_response_listener(&self, _listener: ResponseListener) -> Result<(), NotificationError> {
        // Nothing can be tapped
        Ok(())
    }

    fn present(&self, content: &NotificationContent) -> Result<NotificationId, NotificationError> {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::info!(id = id.0, title = %content.title, body = %content.body, "Now playing");
        Ok(id)
    }

    fn dismiss(&self, id: NotificationId) -> Result<(), NotificationError> {
        tracing::debug!(id = id.0, "Now playing cleared");
        Ok(())
    }

    fn supports_sticky(&self) -> bool {
        false
    }
}

//! Notifications shown by the worker.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Data attached to a notification and handed back on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Scope-relative or absolute URL to open on click.
    pub url: String,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

/// The host's notification surface.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Display a notification.
    async fn show(&self, notification: &Notification) -> Result<(), PlatformError>;

    /// Dismiss a displayed notification.
    async fn close(&self, notification: &Notification) -> Result<(), PlatformError>;
}

/// Records notifications instead of displaying them (for development/testing).
#[derive(Debug, Default)]
pub struct InMemoryNotifications {
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification shown so far.
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every notification dismissed so far.
    pub fn closed(&self) -> Vec<Notification> {
        self.closed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl NotificationSurface for InMemoryNotifications {
    async fn show(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }

    async fn close(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.closed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

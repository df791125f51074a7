//! Worker registration: owns the active version and rolls out new ones.

use std::sync::Arc;

use edge_cache::CacheStatus;
use edge_core::{Request, WorkerConfig};
use tokio::sync::{Mutex, RwLock};

use crate::controller::{ClickOutcome, EdgeController, Served};
use crate::error::{WorkerError, WorkerResult};
use crate::notification::Notification;
use crate::platform::Platform;
use crate::push::PushMessage;

/// Dispatches events to the active controller and replaces it on update.
///
/// Updates are serialized. Events read-lock the active slot for their whole
/// duration and activation write-locks it, so activation waits for in-flight
/// events and no event reaches a version that has not finished activating.
pub struct Registration {
    platform: Platform,
    active: RwLock<Option<Arc<EdgeController>>>,
    lifecycle: Mutex<()>,
}

impl Registration {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            active: RwLock::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Install and activate a version, replacing the active one.
    ///
    /// If install fails, the previously active version keeps serving.
    pub async fn update(&self, config: WorkerConfig) -> WorkerResult<Arc<EdgeController>> {
        let _lifecycle = self.lifecycle.lock().await;

        let candidate = Arc::new(EdgeController::new(config, self.platform.clone())?);
        if let Err(e) = candidate.install().await {
            let active = self.active_version().await;
            tracing::warn!(
                version = candidate.version(),
                active = ?active,
                error = %e,
                "update rejected, keeping active version"
            );
            return Err(e);
        }

        // Skip waiting: promote as soon as the snapshot is complete.
        let mut active = self.active.write().await;
        candidate.activate().await?;

        if let Some(previous) = active.replace(Arc::clone(&candidate)) {
            previous.retire();
        }
        tracing::info!(version = candidate.version(), "version in control");
        Ok(candidate)
    }

    /// The active controller, if any.
    pub async fn active(&self) -> Option<Arc<EdgeController>> {
        self.active.read().await.clone()
    }

    pub async fn active_version(&self) -> Option<String> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|c| c.version().to_string())
    }

    /// Route a page request. Without an active version the page is
    /// uncontrolled and the request goes straight to the network.
    pub async fn fetch(&self, request: Request) -> WorkerResult<Served> {
        let active = self.active.read().await;
        match active.as_ref() {
            Some(controller) => controller.handle_fetch(request).await,
            None => {
                let response = self.platform.network.fetch(&request).await?;
                Ok(Served::new(response, CacheStatus::Bypass))
            }
        }
    }

    /// Deliver a push message to the active version.
    pub async fn push(&self, message: PushMessage) -> WorkerResult<Notification> {
        let active = self.active.read().await;
        let controller = active.as_ref().ok_or(WorkerError::NoController)?;
        controller.handle_push(message).await
    }

    /// Deliver a notification click to the active version.
    pub async fn notification_click(
        &self,
        notification: &Notification,
    ) -> WorkerResult<ClickOutcome> {
        let active = self.active.read().await;
        let controller = active.as_ref().ok_or(WorkerError::NoController)?;
        controller.handle_notification_click(notification).await
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

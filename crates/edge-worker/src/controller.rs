//! One version of the edge cache controller.

use std::sync::{Arc, RwLock};

use edge_cache::{
    should_include_debug_headers, CacheExplainHeaders, CacheStatus, RequestKey, RouteDecision,
    RoutePolicy, SnapshotStorage, SnapshotStore,
};
use edge_core::{ConfigError, Request, RequestId, Response, WorkerConfig, WorkerState};
use edge_data::{FetchClient, FetchError, TimeoutConfig};
use edge_observability::{EventLog, WorkerEvent};
use futures::future::try_join_all;
use http::Method;
use url::Url;

use crate::clients::{ClientId, ClientQuery};
use crate::error::{WorkerError, WorkerResult};
use crate::fallback::{FallbackChain, FallbackStrategy};
use crate::notification::Notification;
use crate::platform::Platform;
use crate::push::PushMessage;

/// A response handed back to the page, with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub status: CacheStatus,
}

impl Served {
    pub fn new(response: Response, status: CacheStatus) -> Self {
        Self { response, status }
    }
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An open same-origin window was brought to the foreground.
    Focused(ClientId),
    /// No such window; a new one was opened at this URL.
    Opened(Url),
}

/// Edge cache controller for a single version.
///
/// Owns the version's lifecycle state and routes intercepted requests
/// between the network and the snapshot store named by the version id.
pub struct EdgeController {
    config: Arc<WorkerConfig>,
    platform: Platform,
    client: FetchClient,
    policy: RoutePolicy,
    storage: SnapshotStorage,
    origin: url::Origin,
    shell_key: RequestKey,
    state: RwLock<WorkerState>,
}

impl EdgeController {
    /// Create a controller for a validated config.
    pub fn new(config: WorkerConfig, platform: Platform) -> WorkerResult<Self> {
        config.validate()?;

        let shell_url = config.resolve(&config.fallback_document).map_err(|e| {
            ConfigError::Invalid(format!(
                "fallback document '{}': {}",
                config.fallback_document, e
            ))
        })?;

        let client = FetchClient::new(Arc::clone(&platform.network))
            .with_timeout(TimeoutConfig::from_config(&config.network));

        Ok(Self {
            policy: RoutePolicy::from_config(&config.routing),
            storage: SnapshotStorage::new(Arc::clone(&platform.snapshots)),
            origin: config.scope.origin(),
            shell_key: RequestKey::get(&shell_url),
            client,
            platform,
            config: Arc::new(config),
            state: RwLock::new(WorkerState::Parsed),
        })
    }

    /// Version identifier, also the snapshot store name.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, next: WorkerState) -> WorkerResult<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.can_transition_to(next) {
            return Err(WorkerError::InvalidTransition {
                from: *state,
                to: next,
            });
        }
        tracing::debug!(version = %self.config.version, from = %*state, to = %next, "lifecycle transition");
        *state = next;
        Ok(())
    }

    /// Mark this version redundant. No-op when the lifecycle forbids it.
    pub fn retire(&self) {
        if self.transition(WorkerState::Redundant).is_ok() {
            tracing::info!(version = %self.config.version, "worker retired");
        }
    }

    fn ensure_active(&self) -> WorkerResult<()> {
        let state = self.state();
        if state.serves_requests() {
            Ok(())
        } else {
            Err(WorkerError::NotActive(state))
        }
    }

    fn logger(&self, event: WorkerEvent, id: RequestId) -> EventLog {
        EventLog::new(event, self.config.version.clone(), id)
    }

    fn current_store(&self) -> SnapshotStore {
        self.storage.store(&self.config.version)
    }

    /// Snapshot every manifest asset into this version's store.
    ///
    /// All-or-nothing: the store is only created once every asset fetched
    /// with a 2xx status. On failure the version becomes redundant.
    pub async fn install(&self) -> WorkerResult<()> {
        let _guard = self.platform.keep_alive.hold("install");
        let logger = self.logger(WorkerEvent::Install, RequestId::generate());
        self.transition(WorkerState::Installing)?;

        match self.snapshot_manifest().await {
            Ok(count) => {
                self.transition(WorkerState::Installed)?;
                self.platform.metrics.record_install(true);
                logger
                    .info("snapshot complete, requesting immediate promotion")
                    .field("assets", count)
                    .emit();
                Ok(())
            }
            Err(e) => {
                self.transition(WorkerState::Redundant)?;
                self.platform.metrics.record_install(false);
                logger
                    .warn("install failed")
                    .field("error", e.to_string())
                    .emit();
                Err(e)
            }
        }
    }

    async fn snapshot_manifest(&self) -> WorkerResult<usize> {
        let fetches = self.config.manifest.iter().map(|path| async move {
            let url = self
                .config
                .resolve(path)
                .map_err(|e| install_failure(path, e))?;
            let key = RequestKey::get(&url);
            let request = Request::new(Method::GET, url);
            let response = self
                .client
                .fetch_ok(&request)
                .await
                .map_err(|e| install_failure(path, e))?;
            Ok::<_, WorkerError>((key, response))
        });
        let entries = try_join_all(fetches).await?;
        let count = entries.len();

        let store = self.storage.open(&self.config.version).await?;
        store.put_all(entries).await?;
        Ok(count)
    }

    /// Delete every other snapshot store and take control of open windows.
    /// Returns the deleted store names.
    pub async fn activate(&self) -> WorkerResult<Vec<String>> {
        let _guard = self.platform.keep_alive.hold("activate");
        let logger = self.logger(WorkerEvent::Activate, RequestId::generate());
        self.transition(WorkerState::Activating)?;

        let pruned = match self.storage.prune_except(&self.config.version).await {
            Ok(pruned) => pruned,
            Err(e) => {
                self.transition(WorkerState::Redundant)?;
                return Err(e.into());
            }
        };

        // Unclaimed windows pick the worker up on their next navigation.
        if let Err(e) = self.platform.clients.claim().await {
            logger
                .warn("could not claim open windows")
                .field("error", e.to_string())
                .emit();
        }

        self.transition(WorkerState::Activated)?;
        self.platform.metrics.record_activation(pruned.len());
        logger
            .info("activated")
            .field("stores_pruned", pruned.len())
            .emit();
        Ok(pruned)
    }

    /// Answer an intercepted request.
    pub async fn handle_fetch(&self, request: Request) -> WorkerResult<Served> {
        let _guard = self.platform.keep_alive.hold("fetch");
        self.ensure_active()?;

        let logger = self.logger(WorkerEvent::Fetch, request.id.clone());
        let key = RequestKey::from_request(&request);
        let decision = self.policy.classify(&request, &self.origin);

        let outcome = match &decision {
            RouteDecision::Bypass { reason } => {
                // Not intercepted: no worker timeout applies.
                tracing::debug!(url = %request.url, %reason, "bypassing snapshot store");
                self.platform
                    .network
                    .fetch(&request)
                    .await
                    .map(|r| Served::new(r, CacheStatus::Bypass))
            }
            RouteDecision::NetworkFirst => self
                .client
                .fetch(&request)
                .await
                .map(|r| Served::new(r, CacheStatus::Network)),
            RouteDecision::CacheFirst => self.cache_first(&request, &key).await,
        };

        let mut served = match outcome {
            Ok(served) => served,
            Err(error) => {
                self.fall_back(&decision, &request, &key, error, &logger)
                    .await?
            }
        };

        self.platform.metrics.record_served(served.status);
        logger
            .debug("served")
            .field("url", request.url.as_str())
            .field("status", served.status.to_string())
            .field("http_status", served.response.status.as_u16())
            .emit();

        if self.config.explain_headers || should_include_debug_headers(&request) {
            CacheExplainHeaders::new()
                .with_status(served.status)
                .with_key(&key)
                .with_version(self.config.version.clone())
                .with_decision(&decision)
                .apply(&mut served.response);
        }

        Ok(served)
    }

    async fn cache_first(&self, request: &Request, key: &RequestKey) -> Result<Served, FetchError> {
        let store = self.current_store();
        match store.get(key).await {
            Ok(Some(response)) => return Ok(Served::new(response, CacheStatus::Hit)),
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, error = %e, "snapshot read failed, treating as miss"),
        }

        let response = self.client.fetch(request).await?;
        if response.is_success() {
            self.write_back(&store, key.clone(), response.clone()).await;
        }
        Ok(Served::new(response, CacheStatus::Miss))
    }

    // Last write wins; concurrent misses for one key are not coordinated.
    async fn write_back(&self, store: &SnapshotStore, key: RequestKey, response: Response) {
        match store.put(key.clone(), response).await {
            Ok(()) => {
                self.platform.metrics.record_write_back(true);
                tracing::debug!(%key, store = store.name(), "write-back");
            }
            Err(e) => {
                self.platform.metrics.record_write_back(false);
                tracing::warn!(%key, store = store.name(), error = %e, "write-back failed");
            }
        }
    }

    async fn fall_back(
        &self,
        decision: &RouteDecision,
        request: &Request,
        key: &RequestKey,
        error: FetchError,
        logger: &EventLog,
    ) -> WorkerResult<Served> {
        let store = self.current_store();
        for step in FallbackChain::for_request(decision, request).steps() {
            let (lookup, status) = match step {
                FallbackStrategy::UseCached => (key, CacheStatus::Fallback),
                FallbackStrategy::ShellDocument => (&self.shell_key, CacheStatus::Shell),
            };
            match store.get(lookup).await {
                Ok(Some(response)) => {
                    logger
                        .info("network failed, serving offline fallback")
                        .field("url", request.url.as_str())
                        .field("fallback", step.to_string())
                        .field("error", error.to_string())
                        .emit();
                    return Ok(Served::new(response, status));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(key = %lookup, error = %e, "fallback lookup failed"),
            }
        }

        self.platform.metrics.record_failure();
        logger
            .warn("network failed with no offline fallback")
            .field("url", request.url.as_str())
            .field("error", error.to_string())
            .emit();
        Err(WorkerError::Unresolved(error))
    }

    /// Display the notification for an inbound push message.
    pub async fn handle_push(&self, message: PushMessage) -> WorkerResult<Notification> {
        let _guard = self.platform.keep_alive.hold("push");
        self.ensure_active()?;

        let notification = message.payload().to_notification(&self.config.push);
        self.platform.notifications.show(&notification).await?;
        self.platform.metrics.record_notification();

        self.logger(WorkerEvent::Push, RequestId::generate())
            .info("notification shown")
            .field("title", notification.title.clone())
            .field("url", notification.data.url.clone())
            .emit();
        Ok(notification)
    }

    /// Dismiss the notification, then focus an open same-origin window or
    /// open one at the notification's target URL.
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
    ) -> WorkerResult<ClickOutcome> {
        let _guard = self.platform.keep_alive.hold("notificationclick");
        self.ensure_active()?;
        let logger = self.logger(WorkerEvent::NotificationClick, RequestId::generate());

        if let Err(e) = self.platform.notifications.close(notification).await {
            logger
                .warn("could not dismiss notification")
                .field("error", e.to_string())
                .emit();
        }
        self.platform.metrics.record_click();

        let windows = self
            .platform
            .clients
            .match_all(ClientQuery::all_windows())
            .await?;

        if let Some(window) = windows.iter().find(|w| w.is_same_origin(&self.origin)) {
            let focused = self.platform.clients.focus(&window.id).await?;
            logger
                .info("focused open window")
                .field("client", focused.id.to_string())
                .emit();
            return Ok(ClickOutcome::Focused(focused.id));
        }

        let target = self.target_url(&notification.data.url);
        let opened = self.platform.clients.open_window(&target).await?;
        logger
            .info("opened window")
            .field("url", opened.url.as_str())
            .emit();
        Ok(ClickOutcome::Opened(opened.url))
    }

    fn target_url(&self, url: &str) -> Url {
        self.config.resolve(url).unwrap_or_else(|e| {
            tracing::warn!(url, error = %e, "invalid notification URL, opening scope");
            self.config.scope.clone()
        })
    }
}

fn install_failure(path: &str, reason: impl std::fmt::Display) -> WorkerError {
    WorkerError::InstallAssetFailure {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

impl std::fmt::Debug for EdgeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeController")
            .field("version", &self.config.version)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

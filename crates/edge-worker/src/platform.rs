//! Host surfaces the worker runs against.

use std::sync::Arc;

use edge_cache::{InMemorySnapshots, SnapshotBackend};
use edge_core::KeepAlive;
use edge_data::{InMemoryNetwork, Network};
use edge_observability::WorkerMetrics;

use crate::clients::{Clients, InMemoryClients};
use crate::notification::{InMemoryNotifications, NotificationSurface};

/// Everything the controller needs from the host. Shared by every version
/// registered against it.
#[derive(Clone)]
pub struct Platform {
    pub network: Arc<dyn Network>,
    pub snapshots: Arc<dyn SnapshotBackend>,
    pub clients: Arc<dyn Clients>,
    pub notifications: Arc<dyn NotificationSurface>,
    pub keep_alive: KeepAlive,
    pub metrics: Arc<WorkerMetrics>,
}

impl Platform {
    /// Bundle host surfaces with a fresh keep-alive tracker and metrics.
    pub fn new(
        network: Arc<dyn Network>,
        snapshots: Arc<dyn SnapshotBackend>,
        clients: Arc<dyn Clients>,
        notifications: Arc<dyn NotificationSurface>,
    ) -> Self {
        Self {
            network,
            snapshots,
            clients,
            notifications,
            keep_alive: KeepAlive::new(),
            metrics: Arc::new(WorkerMetrics::new()),
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("pending", &self.keep_alive.pending())
            .finish_non_exhaustive()
    }
}

/// In-memory host, keeping typed handles to each fake.
#[derive(Debug, Clone)]
pub struct InMemoryPlatform {
    pub network: Arc<InMemoryNetwork>,
    pub snapshots: Arc<InMemorySnapshots>,
    pub clients: Arc<InMemoryClients>,
    pub notifications: Arc<InMemoryNotifications>,
    platform: Platform,
}

impl InMemoryPlatform {
    pub fn new(network: InMemoryNetwork, clients: InMemoryClients) -> Self {
        let network = Arc::new(network);
        let snapshots = Arc::new(InMemorySnapshots::new());
        let clients = Arc::new(clients);
        let notifications = Arc::new(InMemoryNotifications::new());
        let platform = Platform::new(
            network.clone(),
            snapshots.clone(),
            clients.clone(),
            notifications.clone(),
        );
        Self {
            network,
            snapshots,
            clients,
            notifications,
            platform,
        }
    }

    /// The type-erased platform handed to controllers.
    pub fn platform(&self) -> Platform {
        self.platform.clone()
    }
}

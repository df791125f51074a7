//! Window clients of the worker.

use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::PlatformError;

/// Identifier of an open window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A top-level window known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: ClientId,
    pub url: Url,
    pub focused: bool,
    /// Whether this worker already controls the window.
    pub controlled: bool,
}

impl WindowClient {
    /// Whether the window shows a page of `origin`.
    pub fn is_same_origin(&self, origin: &url::Origin) -> bool {
        &self.url.origin() == origin
    }
}

/// Filter for [`Clients::match_all`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientQuery {
    /// Also list windows this worker does not control yet.
    pub include_uncontrolled: bool,
}

impl ClientQuery {
    /// Every window, controlled or not.
    pub fn all_windows() -> Self {
        Self {
            include_uncontrolled: true,
        }
    }
}

/// The host's window management surface.
#[async_trait]
pub trait Clients: Send + Sync {
    /// List open windows in the worker's scope.
    async fn match_all(&self, query: ClientQuery) -> Result<Vec<WindowClient>, PlatformError>;

    /// Bring a window to the foreground.
    async fn focus(&self, id: &ClientId) -> Result<WindowClient, PlatformError>;

    /// Open a new window.
    async fn open_window(&self, url: &Url) -> Result<WindowClient, PlatformError>;

    /// Take control of every open window in scope.
    async fn claim(&self) -> Result<(), PlatformError>;
}

/// In-memory window list (for development/testing).
#[derive(Debug, Default)]
pub struct InMemoryClients {
    state: Mutex<ClientsState>,
}

#[derive(Debug, Default)]
struct ClientsState {
    windows: Vec<WindowClient>,
    opened: Vec<Url>,
    focused: Vec<ClientId>,
    claims: usize,
    next_id: usize,
}

impl InMemoryClients {
    /// No open windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-open window (builder form).
    pub fn with_window(self, url: &str, controlled: bool) -> Self {
        if let Ok(url) = Url::parse(url) {
            let mut state = self.lock();
            let id = state.next_id();
            state.windows.push(WindowClient {
                id,
                url,
                focused: false,
                controlled,
            });
        }
        self
    }

    /// Current windows.
    pub fn windows(&self) -> Vec<WindowClient> {
        self.lock().windows.clone()
    }

    /// URLs passed to `open_window`, in order.
    pub fn opened(&self) -> Vec<Url> {
        self.lock().opened.clone()
    }

    /// Windows passed to `focus`, in order.
    pub fn focused(&self) -> Vec<ClientId> {
        self.lock().focused.clone()
    }

    /// Number of `claim` calls.
    pub fn claims(&self) -> usize {
        self.lock().claims
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClientsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ClientsState {
    fn next_id(&mut self) -> ClientId {
        self.next_id += 1;
        ClientId(format!("window-{}", self.next_id))
    }
}

#[async_trait]
impl Clients for InMemoryClients {
    async fn match_all(&self, query: ClientQuery) -> Result<Vec<WindowClient>, PlatformError> {
        Ok(self
            .lock()
            .windows
            .iter()
            .filter(|w| query.include_uncontrolled || w.controlled)
            .cloned()
            .collect())
    }

    async fn focus(&self, id: &ClientId) -> Result<WindowClient, PlatformError> {
        let mut state = self.lock();
        state.focused.push(id.clone());

        let mut found = None;
        for window in state.windows.iter_mut() {
            window.focused = &window.id == id;
            if window.focused {
                found = Some(window.clone());
            }
        }
        found.ok_or_else(|| PlatformError::ClientNotFound(id.to_string()))
    }

    async fn open_window(&self, url: &Url) -> Result<WindowClient, PlatformError> {
        let mut state = self.lock();
        state.opened.push(url.clone());

        let id = state.next_id();
        for window in state.windows.iter_mut() {
            window.focused = false;
        }
        let window = WindowClient {
            id,
            url: url.clone(),
            focused: true,
            controlled: true,
        };
        state.windows.push(window.clone());
        Ok(window)
    }

    async fn claim(&self) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.claims += 1;
        for window in state.windows.iter_mut() {
            window.controlled = true;
        }
        Ok(())
    }
}

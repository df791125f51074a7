//! Fallbacks for requests the network could not answer.

use edge_cache::RouteDecision;
use edge_core::Request;

/// What to try when the network fails for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Serve a matching entry from the current snapshot store.
    UseCached,
    /// Serve the cached root document so the app shell still boots.
    ShellDocument,
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UseCached => write!(f, "use-cached"),
            Self::ShellDocument => write!(f, "shell-document"),
        }
    }
}

/// Ordered fallbacks for one request. When every step misses, the network
/// error propagates to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackChain {
    steps: Vec<FallbackStrategy>,
}

impl FallbackChain {
    /// Chain for a routed request.
    ///
    /// Bypassed requests get none. Cache-first requests already consulted the
    /// store before going to the network, so only navigations fall back, to
    /// the shell. Network-first requests try the store, then the shell for
    /// navigations.
    pub fn for_request(decision: &RouteDecision, request: &Request) -> Self {
        let mut steps = Vec::new();
        match decision {
            RouteDecision::Bypass { .. } => return Self::default(),
            RouteDecision::NetworkFirst => steps.push(FallbackStrategy::UseCached),
            RouteDecision::CacheFirst => {}
        }
        if request.is_navigation() {
            steps.push(FallbackStrategy::ShellDocument);
        }
        Self { steps }
    }

    /// Steps in order.
    pub fn steps(&self) -> &[FallbackStrategy] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

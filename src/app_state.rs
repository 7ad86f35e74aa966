//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The pub/sub engine shared by sockets and the admin API.
    pub relay: Arc<RelayService>,
}

impl AppState {
    /// Wraps an engine for injection into the router.
    #[must_use]
    pub fn new(relay: RelayService) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

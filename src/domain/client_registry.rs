//! Process-wide registry of connected clients.
//!
//! [`ClientRegistry`] maps [`ClientId`] to a shared `Arc<Client>`. Lookups
//! hand out the live entry, not a copy, so an admin grant or subscription
//! change made through one handle is visible through every other.
//!
//! A client that has been marked closed is no longer routable: `lookup`,
//! `snapshot` and `admins` skip it even while teardown has not yet removed
//! its entry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Client, ClientId};
use crate::error::RelayError;

/// Central store for all connected clients.
///
/// # Concurrency
///
/// A single `RwLock` guards the map. The lock is only held for map
/// operations; it is never held while writing to a connection or while
/// acquiring the channel registry lock.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, Arc<Client>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a client and returns its identifier.
    pub async fn register(&self, client: Arc<Client>) -> ClientId {
        let id = client.id();
        self.clients.write().await.insert(id, client);
        id
    }

    /// Returns the live handle for a client.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ClientNotFound`] if no client with the given
    /// ID is connected, or if it is being torn down.
    pub async fn lookup(&self, id: ClientId) -> Result<Arc<Client>, RelayError> {
        self.clients
            .read()
            .await
            .get(&id)
            .filter(|c| !c.is_closed())
            .map(Arc::clone)
            .ok_or_else(|| RelayError::ClientNotFound(id.to_string()))
    }

    /// Removes a client, returning its handle if it was registered.
    pub async fn remove(&self, id: ClientId) -> Option<Arc<Client>> {
        self.clients.write().await.remove(&id)
    }

    /// Returns handles to every connected client.
    pub async fn snapshot(&self) -> Vec<Arc<Client>> {
        self.clients
            .read()
            .await
            .values()
            .filter(|c| !c.is_closed())
            .map(Arc::clone)
            .collect()
    }

    /// Returns handles to every connected admin client.
    pub async fn admins(&self) -> Vec<Arc<Client>> {
        self.clients
            .read()
            .await
            .values()
            .filter(|c| c.is_admin() && !c.is_closed())
            .map(Arc::clone)
            .collect()
    }

    /// Returns the number of connected clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns `true` if no client is connected.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

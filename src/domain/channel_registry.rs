//! Process-wide registry of channels.
//!
//! Channels are created and replaced only by administrative action, never
//! implicitly by a subscription. Every mutation of a subscriber set happens
//! under this registry's write lock, which is what keeps a channel's
//! subscribers and each client's own subscription set in agreement.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Channel, ChannelInfo, ChannelPolicy, Client, ClientId};
use crate::error::RelayError;

/// Central store for all channels.
///
/// # Concurrency
///
/// One `RwLock` guards the whole map (coarse registry-level locking).
/// Lock order across the crate is: client registry (never held while
/// taking this one), then this registry, then a client's subscription set
/// as a leaf. Delivery snapshots subscribers and releases the lock before
/// writing to any connection.
#[derive(Debug)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Channel>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Returns all channel names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Creates the channel, or replaces it if it already exists.
    ///
    /// Replacing always starts from an empty subscriber set; previous
    /// subscribers have the channel removed from their own subscription
    /// sets. Returns the number of subscribers dropped.
    pub async fn put(&self, name: &str, policy: ChannelPolicy) -> usize {
        let mut map = self.channels.write().await;
        let dropped = map
            .insert(name.to_string(), Channel::new(name, policy))
            .map_or(0, |mut previous| previous.unlink_all());
        tracing::debug!(channel = name, ?policy, dropped, "channel put");
        dropped
    }

    /// Deletes a channel and clears it from every subscriber's
    /// subscription set. Returns the number of subscribers dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ChannelNotFound`] if no channel with the given
    /// name exists.
    pub async fn delete(&self, name: &str) -> Result<usize, RelayError> {
        let mut map = self.channels.write().await;
        let mut channel = map
            .remove(name)
            .ok_or_else(|| RelayError::ChannelNotFound(name.to_string()))?;
        let dropped = channel.unlink_all();
        tracing::debug!(channel = name, dropped, "channel deleted");
        Ok(dropped)
    }

    /// Returns a snapshot of a channel.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ChannelNotFound`] if no channel with the given
    /// name exists.
    pub async fn lookup(&self, name: &str) -> Result<ChannelInfo, RelayError> {
        self.channels
            .read()
            .await
            .get(name)
            .map(Channel::info)
            .ok_or_else(|| RelayError::ChannelNotFound(name.to_string()))
    }

    /// Returns the number of channels.
    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Returns `true` if there are no channels.
    pub async fn is_empty(&self) -> bool {
        self.channels.read().await.is_empty()
    }

    /// Subscribes `client` to `name` if `gate` accepts the channel policy.
    /// Returns `false` if the client was already subscribed.
    pub(crate) async fn attach(
        &self,
        name: &str,
        client: &Arc<Client>,
        gate: impl FnOnce(ChannelPolicy) -> Result<(), RelayError>,
    ) -> Result<bool, RelayError> {
        let mut map = self.channels.write().await;
        let channel = map
            .get_mut(name)
            .ok_or_else(|| RelayError::ChannelNotFound(name.to_string()))?;
        gate(channel.policy())?;
        // Checked under the write lock so a session being torn down can
        // never be re-added after its eviction.
        if client.is_closed() {
            return Err(RelayError::ClientNotFound(client.id().to_string()));
        }
        Ok(channel.link(client))
    }

    /// Unsubscribes `id` from `name` if `gate` accepts the channel policy.
    /// Returns `false` if the client was not subscribed.
    pub(crate) async fn detach(
        &self,
        name: &str,
        id: ClientId,
        gate: impl FnOnce(ChannelPolicy) -> Result<(), RelayError>,
    ) -> Result<bool, RelayError> {
        let mut map = self.channels.write().await;
        let channel = map
            .get_mut(name)
            .ok_or_else(|| RelayError::ChannelNotFound(name.to_string()))?;
        gate(channel.policy())?;
        Ok(channel.unlink(id))
    }

    /// Removes `client` from every channel it is subscribed to in a single
    /// critical section. Returns the number of channels it was removed from.
    pub(crate) async fn evict(&self, client: &Client) -> usize {
        let mut map = self.channels.write().await;
        let id = client.id();
        let mut removed = 0;
        for name in client.take_subscriptions() {
            if map.get_mut(&name).is_some_and(|channel| channel.unlink(id)) {
                removed += 1;
            }
        }
        removed
    }

    /// Returns the current subscribers of `name` if `gate` accepts the
    /// channel policy.
    pub(crate) async fn recipients(
        &self,
        name: &str,
        gate: impl FnOnce(ChannelPolicy) -> Result<(), RelayError>,
    ) -> Result<Vec<Arc<Client>>, RelayError> {
        let map = self.channels.read().await;
        let channel = map
            .get(name)
            .ok_or_else(|| RelayError::ChannelNotFound(name.to_string()))?;
        gate(channel.policy())?;
        Ok(channel.subscribers())
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

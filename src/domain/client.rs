//! A connected client: identity, privilege, subscriptions and the
//! exclusive outbound write handle.

use std::collections::HashSet;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::{Sink, SinkExt};

use super::ClientId;
use crate::error::RelayError;

/// Outbound half of a client connection, carrying rendered text frames.
///
/// The WebSocket session adapts its split sink into this shape; tests use
/// in-memory sinks.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = RelayError> + Send>>;

/// One connected session as seen by the relay.
///
/// Shared as `Arc<Client>` between the [`super::ClientRegistry`], every
/// [`super::Channel`] it is subscribed to, and the session task that owns
/// the connection. State changes through any handle are visible to all.
///
/// # Locking
///
/// - `subscriptions` is a leaf lock: it is only mutated while the channel
///   registry write lock is held, and never held across an `.await`.
/// - `outbound` serializes writes to the connection. It is never held
///   together with a registry lock.
pub struct Client {
    id: ClientId,
    admin: AtomicBool,
    closed: AtomicBool,
    connected_at: DateTime<Utc>,
    subscriptions: Mutex<HashSet<String>>,
    outbound: tokio::sync::Mutex<FrameSink>,
}

impl Client {
    /// Creates a non-admin client with a fresh identifier writing to `sink`.
    #[must_use]
    pub fn new(sink: FrameSink) -> Self {
        Self {
            id: ClientId::new(),
            admin: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            connected_at: Utc::now(),
            subscriptions: Mutex::new(HashSet::new()),
            outbound: tokio::sync::Mutex::new(sink),
        }
    }

    /// Returns the client identifier.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Returns `true` once the client has presented the admin secret.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin.load(Ordering::Acquire)
    }

    /// Elevates the client to admin. There is no way back.
    pub fn grant_admin(&self) {
        self.admin.store(true, Ordering::Release);
    }

    /// Returns `true` once the session has started tearing down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Timestamp at which the connection was accepted.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Returns the names of the channels this client is subscribed to,
    /// sorted for stable output.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.subscription_set().iter().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns `true` if the client is subscribed to `channel`.
    #[must_use]
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.subscription_set().contains(channel)
    }

    /// Writes one text frame to the connection.
    ///
    /// Holds this client's outbound lock for the duration of the write, so
    /// concurrent deliveries to the same client never interleave.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the underlying sink rejects the
    /// frame (typically because the peer went away).
    pub async fn send(&self, frame: String) -> Result<(), RelayError> {
        let mut sink = self.outbound.lock().await;
        sink.send(frame).await
    }

    /// Flushes and closes the outbound half of the connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the sink fails while closing.
    pub async fn close(&self) -> Result<(), RelayError> {
        let mut sink = self.outbound.lock().await;
        sink.close().await
    }

    /// Marks the client closed. Returns `true` only for the first call.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn record_subscription(&self, channel: &str) -> bool {
        self.subscription_set().insert(channel.to_string())
    }

    pub(crate) fn forget_subscription(&self, channel: &str) -> bool {
        self.subscription_set().remove(channel)
    }

    pub(crate) fn take_subscriptions(&self) -> HashSet<String> {
        std::mem::take(&mut *self.subscription_set())
    }

    fn subscription_set(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set is always left consistent, so a poisoned lock is still usable.
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("admin", &self.is_admin())
            .field("closed", &self.is_closed())
            .field("connected_at", &self.connected_at)
            .field("subscriptions", &self.subscriptions())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::testutil::{channel_client, failing_client};

    #[test]
    fn starts_as_plain_open_client() {
        let (client, _rx) = channel_client();
        assert!(!client.is_admin());
        assert!(!client.is_closed());
        assert!(client.subscriptions().is_empty());
    }

    #[test]
    fn grant_admin_is_visible_through_every_handle() {
        let (client, _rx) = channel_client();
        let other = std::sync::Arc::clone(&client);
        other.grant_admin();
        assert!(client.is_admin());
    }

    #[test]
    fn mark_closed_reports_first_transition_only() {
        let (client, _rx) = channel_client();
        assert!(client.mark_closed());
        assert!(!client.mark_closed());
        assert!(client.is_closed());
    }

    #[test]
    fn subscription_set_has_no_duplicates() {
        let (client, _rx) = channel_client();
        assert!(client.record_subscription("news"));
        assert!(!client.record_subscription("news"));
        assert!(client.record_subscription("alerts"));
        assert_eq!(client.subscriptions(), vec!["alerts", "news"]);
        assert!(client.forget_subscription("news"));
        assert!(!client.is_subscribed("news"));
    }

    #[tokio::test]
    async fn send_reaches_the_sink() {
        let (client, mut rx) = channel_client();
        tokio_test::assert_ok!(client.send("hello".to_string()).await);
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn send_to_broken_sink_is_transport_error() {
        let client = failing_client();
        let result = client.send("hello".to_string()).await;
        let Err(RelayError::Transport(_)) = result else {
            panic!("expected transport error, got {result:?}");
        };
    }
}

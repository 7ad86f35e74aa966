//! Relay service: owns the registries, wires the subscription manager,
//! message router and admin authenticator together, and dispatches parsed
//! socket commands.

use std::sync::Arc;

use crate::domain::{
    ChannelPolicy, ChannelRegistry, Client, ClientRegistry, FrameSink, LifecycleEvent,
};
use crate::error::RelayError;

use super::auth::{AdminAuthenticator, CredentialVerifier};
use super::command::Command;
use super::router::{Delivery, MessageRouter};
use super::subscription::{Privacy, SubscriptionManager};

/// Effect of a successfully executed socket command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `sub`: whether the membership changed.
    Subscribed(bool),
    /// `unsub`: whether the membership changed.
    Unsubscribed(bool),
    /// `admin-token`: the client is now an admin.
    Elevated,
    /// `pub`, `broadcast`, `message`: fan-out report.
    Delivered(Delivery),
}

/// Process-wide pub/sub engine.
///
/// Created once at startup and shared behind `Arc` by every connection
/// session and the administrative API. Cloning is cheap and yields a
/// handle onto the same registries.
#[derive(Debug, Clone)]
pub struct RelayService {
    clients: Arc<ClientRegistry>,
    channels: Arc<ChannelRegistry>,
    subscriptions: SubscriptionManager,
    router: MessageRouter,
    authenticator: AdminAuthenticator,
}

impl RelayService {
    /// Creates an engine with empty registries.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        let clients = Arc::new(ClientRegistry::new());
        let channels = Arc::new(ChannelRegistry::new());
        Self {
            subscriptions: SubscriptionManager::new(Arc::clone(&clients), Arc::clone(&channels)),
            router: MessageRouter::new(Arc::clone(&clients), Arc::clone(&channels)),
            authenticator: AdminAuthenticator::new(verifier),
            clients,
            channels,
        }
    }

    /// Returns the client registry.
    #[must_use]
    pub fn clients(&self) -> &Arc<ClientRegistry> {
        &self.clients
    }

    /// Returns the channel registry.
    #[must_use]
    pub fn channels(&self) -> &Arc<ChannelRegistry> {
        &self.channels
    }

    /// Returns the subscription manager.
    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    /// Returns the admin authenticator.
    #[must_use]
    pub fn authenticator(&self) -> &AdminAuthenticator {
        &self.authenticator
    }

    /// Registers a new connection and notifies admins.
    pub async fn connect(&self, sink: FrameSink) -> Arc<Client> {
        let client = Arc::new(Client::new(sink));
        let client_id = self.clients.register(Arc::clone(&client)).await;
        self.router
            .notify_admins(client_id, LifecycleEvent::Connected)
            .await;
        tracing::info!(%client_id, "client connected");
        client
    }

    /// Purges a connection from every channel and from the client
    /// registry, then notifies admins.
    ///
    /// Idempotent: returns `false` and does nothing if the client was
    /// already disconnected.
    pub async fn disconnect(&self, client: &Client) -> bool {
        if !client.mark_closed() {
            return false;
        }
        let client_id = client.id();
        // Once marked closed the client is skipped by every lookup and
        // fan-out, so the removals below are never observable piecemeal.
        let channels = self.channels.evict(client).await;
        self.clients.remove(client_id).await;
        self.router
            .notify_admins(client_id, LifecycleEvent::Disconnected)
            .await;
        tracing::info!(%client_id, channels, "client disconnected");
        true
    }

    /// Parses and executes one inbound socket message for `client`.
    ///
    /// # Errors
    ///
    /// Propagates parse errors from [`Command::parse`] and execution errors
    /// from [`RelayService::execute`].
    pub async fn handle_line(&self, client: &Client, line: &str) -> Result<Outcome, RelayError> {
        let command = Command::parse(line)?;
        self.execute(client, command).await
    }

    /// Routes a parsed command to the component that implements it.
    ///
    /// # Errors
    ///
    /// Returns whatever the target component reports: not found,
    /// unauthorized, or a transport failure.
    pub async fn execute(&self, client: &Client, command: Command<'_>) -> Result<Outcome, RelayError> {
        match command {
            Command::Subscribe { channel } => self
                .subscriptions
                .subscribe(client.id(), channel, Privacy::Enforce)
                .await
                .map(Outcome::Subscribed),
            Command::Unsubscribe { channel } => self
                .subscriptions
                .unsubscribe(client.id(), channel, Privacy::Enforce)
                .await
                .map(Outcome::Unsubscribed),
            Command::AdminToken { token } => self
                .authenticator
                .elevate(client, token)
                .map(|()| Outcome::Elevated),
            Command::Publish { channel, body } => self
                .router
                .publish(client, channel, body)
                .await
                .map(Outcome::Delivered),
            Command::Broadcast { body } => self
                .router
                .broadcast(client, body)
                .await
                .map(Outcome::Delivered),
            Command::Message { target, body } => self
                .router
                .direct_message(client, target, body)
                .await
                .map(Outcome::Delivered),
        }
    }

    /// Creates or replaces a channel. Returns the number of subscribers
    /// dropped by a replacement.
    pub async fn put_channel(&self, name: &str, policy: ChannelPolicy) -> usize {
        self.channels.put(name, policy).await
    }

    /// Deletes a channel. Returns the number of subscribers dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ChannelNotFound`] if the channel does not
    /// exist.
    pub async fn delete_channel(&self, name: &str) -> Result<usize, RelayError> {
        self.channels.delete(name).await
    }

    /// Returns all channel names, sorted.
    pub async fn list_channels(&self) -> Vec<String> {
        self.channels.list().await
    }
}

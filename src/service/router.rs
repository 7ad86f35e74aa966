//! Message router: channel publish, admin broadcast, admin direct message
//! and admin lifecycle notifications.
//!
//! Recipients are snapshotted under the registry lock, the lock is
//! released, and then every recipient is written to concurrently. Each
//! write holds only that recipient's outbound lock, so one slow or broken
//! connection neither blocks nor aborts delivery to the others. Failed
//! writes are logged and dropped, never retried.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::domain::{ChannelRegistry, Client, ClientId, ClientRegistry, Frame, LifecycleEvent};
use crate::error::RelayError;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients a write was attempted on.
    pub attempted: usize,
    /// Writes that completed successfully.
    pub delivered: usize,
}

impl Delivery {
    /// Number of writes that failed.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.attempted.saturating_sub(self.delivered)
    }
}

/// Routes messages to channel subscribers, all clients, or one client.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    clients: Arc<ClientRegistry>,
    channels: Arc<ChannelRegistry>,
}

impl MessageRouter {
    /// Creates a router over the shared registries.
    #[must_use]
    pub fn new(clients: Arc<ClientRegistry>, channels: Arc<ChannelRegistry>) -> Self {
        Self { clients, channels }
    }

    /// Publishes `body` to every current subscriber of `channel`.
    ///
    /// # Errors
    ///
    /// - [`RelayError::ChannelNotFound`] if the channel does not exist.
    /// - [`RelayError::Unauthorized`] if the channel does not allow
    ///   broadcast and the sender is not an admin.
    pub async fn publish(
        &self,
        sender: &Client,
        channel: &str,
        body: &str,
    ) -> Result<Delivery, RelayError> {
        let recipients = self
            .channels
            .recipients(channel, |policy| {
                if policy.allow_broadcast || sender.is_admin() {
                    Ok(())
                } else {
                    Err(RelayError::Unauthorized("channel does not allow broadcast"))
                }
            })
            .await?;
        let frame = Frame::Channel {
            channel,
            sender: sender.id(),
            body,
        };
        Ok(deliver(&recipients, &frame).await)
    }

    /// Sends `body` to every connected client.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unauthorized`] if the sender is not an admin.
    pub async fn broadcast(&self, sender: &Client, body: &str) -> Result<Delivery, RelayError> {
        require_admin(sender, "broadcast requires admin")?;
        let recipients = self.clients.snapshot().await;
        let frame = Frame::Broadcast {
            sender: sender.id(),
            body,
        };
        Ok(deliver(&recipients, &frame).await)
    }

    /// Sends `body` to the client identified by `target`.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Unauthorized`] if the sender is not an admin.
    /// - [`RelayError::ClientNotFound`] if `target` is not a connected
    ///   client.
    pub async fn direct_message(
        &self,
        sender: &Client,
        target: &str,
        body: &str,
    ) -> Result<Delivery, RelayError> {
        require_admin(sender, "direct message requires admin")?;
        let recipient = self.clients.lookup(target.parse()?).await?;
        let frame = Frame::System {
            sender: sender.id(),
            body,
        };
        Ok(deliver(&[recipient], &frame).await)
    }

    /// Tells every connected admin that `client` connected or disconnected.
    pub async fn notify_admins(&self, client: ClientId, event: LifecycleEvent) -> Delivery {
        let recipients = self.clients.admins().await;
        deliver(&recipients, &Frame::Notify { client, event }).await
    }
}

fn require_admin(sender: &Client, action: &'static str) -> Result<(), RelayError> {
    if sender.is_admin() {
        Ok(())
    } else {
        Err(RelayError::Unauthorized(action))
    }
}

async fn deliver(recipients: &[Arc<Client>], frame: &Frame<'_>) -> Delivery {
    let text = frame.to_string();
    let results = join_all(recipients.iter().map(|client| {
        let text = text.clone();
        async move { (client.id(), client.send(text).await) }
    }))
    .await;

    let mut delivery = Delivery {
        attempted: results.len(),
        delivered: 0,
    };
    for (client_id, result) in results {
        match result {
            Ok(()) => delivery.delivered += 1,
            Err(e) => {
                tracing::warn!(%client_id, tag = frame.tag(), error = %e, "delivery failed");
            }
        }
    }
    tracing::debug!(
        tag = frame.tag(),
        attempted = delivery.attempted,
        delivered = delivery.delivered,
        "frame delivered"
    );
    delivery
}

//! Subscription manager: adds and removes clients from channels under the
//! channel privacy policy.
//!
//! Both sides of the relation (channel subscriber set, client subscription
//! set) are updated together inside the channel registry's critical
//! section; call sites never touch either side directly.

use std::sync::Arc;

use crate::domain::{ChannelPolicy, ChannelRegistry, Client, ClientId, ClientRegistry};
use crate::error::RelayError;

/// Whether the public/private gate applies to a subscription change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    /// Self-service path (socket protocol): non-admins may only join or
    /// leave public channels.
    Enforce,
    /// Administrative path: the gate is skipped.
    Bypass,
}

/// Coordinates subscription changes across both registries.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    clients: Arc<ClientRegistry>,
    channels: Arc<ChannelRegistry>,
}

impl SubscriptionManager {
    /// Creates a manager over the shared registries.
    #[must_use]
    pub fn new(clients: Arc<ClientRegistry>, channels: Arc<ChannelRegistry>) -> Self {
        Self { clients, channels }
    }

    /// Subscribes a client to a channel.
    ///
    /// Returns `Ok(false)` when the client was already subscribed.
    ///
    /// # Errors
    ///
    /// - [`RelayError::ClientNotFound`] if the client is not connected.
    /// - [`RelayError::ChannelNotFound`] if the channel does not exist.
    /// - [`RelayError::Unauthorized`] if privacy is enforced, the client is
    ///   not an admin and the channel is not public.
    pub async fn subscribe(
        &self,
        client_id: ClientId,
        channel: &str,
        privacy: Privacy,
    ) -> Result<bool, RelayError> {
        let client = self.clients.lookup(client_id).await?;
        let added = self
            .channels
            .attach(channel, &client, |policy| gate(&client, policy, privacy))
            .await?;
        tracing::debug!(%client_id, channel, added, "subscribe applied");
        Ok(added)
    }

    /// Unsubscribes a client from a channel.
    ///
    /// Returns `Ok(false)` when the client was not subscribed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SubscriptionManager::subscribe`].
    pub async fn unsubscribe(
        &self,
        client_id: ClientId,
        channel: &str,
        privacy: Privacy,
    ) -> Result<bool, RelayError> {
        let client = self.clients.lookup(client_id).await?;
        let removed = self
            .channels
            .detach(channel, client_id, |policy| gate(&client, policy, privacy))
            .await?;
        tracing::debug!(%client_id, channel, removed, "unsubscribe applied");
        Ok(removed)
    }
}

fn gate(client: &Client, policy: ChannelPolicy, privacy: Privacy) -> Result<(), RelayError> {
    if privacy == Privacy::Enforce && !client.is_admin() && !policy.is_public {
        return Err(RelayError::Unauthorized("channel is not public"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::testutil::channel_client;

    struct Fixture {
        clients: Arc<ClientRegistry>,
        channels: Arc<ChannelRegistry>,
        manager: SubscriptionManager,
    }

    fn fixture() -> Fixture {
        let clients = Arc::new(ClientRegistry::new());
        let channels = Arc::new(ChannelRegistry::new());
        let manager = SubscriptionManager::new(Arc::clone(&clients), Arc::clone(&channels));
        Fixture {
            clients,
            channels,
            manager,
        }
    }

    async fn subscribers(channels: &ChannelRegistry, name: &str) -> Vec<ClientId> {
        let Ok(info) = channels.lookup(name).await else {
            panic!("channel {name} must exist");
        };
        info.subscribers
    }

    #[tokio::test]
    async fn subscribe_is_idempotent_and_bidirectional() {
        let fx = fixture();
        fx.channels.put("news", ChannelPolicy::new(true, false)).await;
        let (client, _rx) = channel_client();
        let id = fx.clients.register(Arc::clone(&client)).await;

        assert_eq!(fx.manager.subscribe(id, "news", Privacy::Enforce).await, Ok(true));
        assert_eq!(fx.manager.subscribe(id, "news", Privacy::Enforce).await, Ok(false));
        assert_eq!(subscribers(&fx.channels, "news").await, vec![id]);
        assert_eq!(client.subscriptions(), vec!["news"]);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent_and_bidirectional() {
        let fx = fixture();
        fx.channels.put("news", ChannelPolicy::new(true, false)).await;
        let (client, _rx) = channel_client();
        let id = fx.clients.register(Arc::clone(&client)).await;

        assert_eq!(fx.manager.unsubscribe(id, "news", Privacy::Enforce).await, Ok(false));
        tokio_test::assert_ok!(fx.manager.subscribe(id, "news", Privacy::Enforce).await);
        assert_eq!(fx.manager.unsubscribe(id, "news", Privacy::Enforce).await, Ok(true));
        assert!(subscribers(&fx.channels, "news").await.is_empty());
        assert!(client.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn private_channel_rejects_plain_client_when_enforced() {
        let fx = fixture();
        fx.channels.put("ops", ChannelPolicy::new(false, false)).await;
        let (client, _rx) = channel_client();
        let id = fx.clients.register(Arc::clone(&client)).await;

        assert_eq!(
            fx.manager.subscribe(id, "ops", Privacy::Enforce).await,
            Err(RelayError::Unauthorized("channel is not public"))
        );
        assert!(client.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn admin_and_bypass_skip_the_privacy_gate() {
        let fx = fixture();
        fx.channels.put("ops", ChannelPolicy::new(false, false)).await;
        let (admin, _ra) = channel_client();
        admin.grant_admin();
        let admin_id = fx.clients.register(admin).await;
        let (plain, _rp) = channel_client();
        let plain_id = fx.clients.register(plain).await;

        assert_eq!(fx.manager.subscribe(admin_id, "ops", Privacy::Enforce).await, Ok(true));
        assert_eq!(fx.manager.subscribe(plain_id, "ops", Privacy::Bypass).await, Ok(true));
        assert_eq!(
            fx.manager.unsubscribe(plain_id, "ops", Privacy::Enforce).await,
            Err(RelayError::Unauthorized("channel is not public"))
        );
        assert_eq!(fx.manager.unsubscribe(plain_id, "ops", Privacy::Bypass).await, Ok(true));
    }

    #[tokio::test]
    async fn unknown_client_or_channel_is_not_found() {
        let fx = fixture();
        fx.channels.put("news", ChannelPolicy::new(true, true)).await;
        let ghost = ClientId::new();
        assert_eq!(
            fx.manager.subscribe(ghost, "news", Privacy::Enforce).await,
            Err(RelayError::ClientNotFound(ghost.to_string()))
        );

        let (client, _rx) = channel_client();
        let id = fx.clients.register(client).await;
        assert_eq!(
            fx.manager.subscribe(id, "ghost", Privacy::Enforce).await,
            Err(RelayError::ChannelNotFound("ghost".to_string()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_settle_on_each_clients_last_operation() {
        let fx = fixture();
        fx.channels.put("news", ChannelPolicy::new(true, true)).await;
        let (a, _ra) = channel_client();
        let (b, _rb) = channel_client();
        let a_id = fx.clients.register(Arc::clone(&a)).await;
        let b_id = fx.clients.register(Arc::clone(&b)).await;

        // `a` ends on a subscribe, `b` on an unsubscribe.
        let toggle = |id: ClientId, end_subscribed: bool| {
            let manager = fx.manager.clone();
            tokio::spawn(async move {
                for i in 0..100 {
                    let subscribe = (i % 2 == 0) != end_subscribed;
                    let result = if subscribe {
                        manager.subscribe(id, "news", Privacy::Enforce).await
                    } else {
                        manager.unsubscribe(id, "news", Privacy::Enforce).await
                    };
                    tokio_test::assert_ok!(result);
                }
            })
        };
        let (ra, rb) = tokio::join!(toggle(a_id, true), toggle(b_id, false));
        tokio_test::assert_ok!(ra);
        tokio_test::assert_ok!(rb);

        assert_eq!(subscribers(&fx.channels, "news").await, vec![a_id]);
        assert_eq!(a.subscriptions(), vec!["news"]);
        assert!(b.subscriptions().is_empty());
    }
}

//! Named routing destination with visibility/broadcast policy and a
//! subscriber set.

use std::collections::HashMap;
use std::sync::Arc;


use super::{Client, ClientId};

/// Who may read from and write into a channel without admin rights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelPolicy {
    /// Non-admin clients may subscribe themselves.
    pub is_public: bool,
    /// Non-admin clients may publish into the channel.
    pub allow_broadcast: bool,
}

impl ChannelPolicy {
    /// Creates a policy from its two flags.
    #[must_use]
    pub const fn new(is_public: bool, allow_broadcast: bool) -> Self {
        Self {
            is_public,
            allow_broadcast,
        }
    }
}

/// A live channel inside the [`super::ChannelRegistry`].
///
/// Subscribers are held as shared, non-owning handles: the channel never
/// decides when a client goes away. The subscriber map and each member's
/// own subscription set are two views of one relation, and only
/// [`Channel::link`], [`Channel::unlink`] and [`Channel::unlink_all`]
/// touch either side.
#[derive(Debug)]
pub struct Channel {
    name: String,
    policy: ChannelPolicy,
    subscribers: HashMap<ClientId, Arc<Client>>,
}

impl Channel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new(name: impl Into<String>, policy: ChannelPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            subscribers: HashMap::new(),
        }
    }

    /// Channel policy.
    #[must_use]
    pub const fn policy(&self) -> ChannelPolicy {
        self.policy
    }

    /// Number of current subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if the client is subscribed.
    #[must_use]
    pub fn has_subscriber(&self, id: ClientId) -> bool {
        self.subscribers.contains_key(&id)
    }

    /// Clones the handles of subscribers that are still open so delivery
    /// can happen without holding the registry lock.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Arc<Client>> {
        self.subscribers
            .values()
            .filter(|c| !c.is_closed())
            .map(Arc::clone)
            .collect()
    }

    /// Adds `client` on both sides of the relation. Returns `false` if it
    /// was already subscribed.
    pub(crate) fn link(&mut self, client: &Arc<Client>) -> bool {
        let added = self
            .subscribers
            .insert(client.id(), Arc::clone(client))
            .is_none();
        client.record_subscription(&self.name);
        added
    }

    /// Removes `id` from both sides of the relation. Returns `false` if it
    /// was not subscribed.
    pub(crate) fn unlink(&mut self, id: ClientId) -> bool {
        match self.subscribers.remove(&id) {
            Some(client) => {
                client.forget_subscription(&self.name);
                true
            }
            None => false,
        }
    }

    /// Drops every subscriber, clearing this channel from each client's
    /// subscription set. Returns how many were removed.
    pub(crate) fn unlink_all(&mut self) -> usize {
        let count = self.subscribers.len();
        for (_, client) in self.subscribers.drain() {
            client.forget_subscription(&self.name);
        }
        count
    }

    /// Immutable snapshot for callers outside the registry lock.
    #[must_use]
    pub fn info(&self) -> ChannelInfo {
        let mut subscribers: Vec<ClientId> = self.subscribers.keys().copied().collect();
        subscribers.sort_unstable();
        ChannelInfo {
            name: self.name.clone(),
            policy: self.policy,
            subscribers,
        }
    }
}

/// Point-in-time view of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel name.
    pub name: String,
    /// Channel policy.
    pub policy: ChannelPolicy,
    /// Subscribed client ids, sorted.
    pub subscribers: Vec<ClientId>,
}

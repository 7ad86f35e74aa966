//! Outbound frames delivered to clients.
//!
//! Every delivered message is a single text frame whose first token tells
//! the recipient where it came from:
//!
//! | Kind      | Wire form                                  |
//! |-----------|--------------------------------------------|
//! | Channel   | `<channel> <senderId> <body>`              |
//! | Broadcast | `__broadcast <senderId> <body>`            |
//! | System    | `__system <senderId> <body>`               |
//! | Notify    | `__notify <clientId> <CONNECTED or DISCONNECTED>` |

use std::fmt;


use super::ClientId;

/// Tag prefix for admin broadcasts.
pub const BROADCAST_TAG: &str = "__broadcast";
/// Tag prefix for admin direct messages.
pub const SYSTEM_TAG: &str = "__system";
/// Tag prefix for lifecycle notifications sent to admins.
pub const NOTIFY_TAG: &str = "__notify";

/// Connection lifecycle event reported to admin clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A client connection was accepted and registered.
    Connected,
    /// A client connection closed and was purged.
    Disconnected,
}

impl LifecycleEvent {
    /// Returns the wire token for this event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message on its way to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Published into a channel.
    Channel {
        /// Channel the message was published to.
        channel: &'a str,
        /// Publishing client.
        sender: ClientId,
        /// Message body.
        body: &'a str,
    },
    /// Admin broadcast to every connected client.
    Broadcast {
        /// Broadcasting admin.
        sender: ClientId,
        /// Message body.
        body: &'a str,
    },
    /// Admin direct message to a single client.
    System {
        /// Sending admin.
        sender: ClientId,
        /// Message body.
        body: &'a str,
    },
    /// Lifecycle notification for admins.
    Notify {
        /// Client whose lifecycle changed.
        client: ClientId,
        /// What happened.
        event: LifecycleEvent,
    },
}

impl Frame<'_> {
    /// Returns the routing tag (first token) of the frame.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Channel { channel, .. } => *channel,
            Self::Broadcast { .. } => BROADCAST_TAG,
            Self::System { .. } => SYSTEM_TAG,
            Self::Notify { .. } => NOTIFY_TAG,
        }
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel {
                channel,
                sender,
                body,
            } => write!(f, "{channel} {sender} {body}"),
            Self::Broadcast { sender, body } => write!(f, "{BROADCAST_TAG} {sender} {body}"),
            Self::System { sender, body } => write!(f, "{SYSTEM_TAG} {sender} {body}"),
            Self::Notify { client, event } => write!(f, "{NOTIFY_TAG} {client} {event}"),
        }
    }
}

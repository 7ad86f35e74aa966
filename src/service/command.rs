//! Socket protocol commands.
//!
//! One command per message: a case-sensitive keyword, a single space, and
//! the rest of the line. `pub` and `message` split the rest once more into
//! a target and a body; the body keeps any further spaces verbatim.
//!
//! | Keyword       | Form                          |
//! |---------------|-------------------------------|
//! | `sub`         | `sub <channel>`               |
//! | `unsub`       | `unsub <channel>`             |
//! | `admin-token` | `admin-token <secret>`        |
//! | `pub`         | `pub <channel> <body>`        |
//! | `broadcast`   | `broadcast <body>`            |
//! | `message`     | `message <clientId> <body>`   |

use crate::error::RelayError;

/// A parsed inbound command, borrowing from the received text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Join a channel (privacy enforced).
    Subscribe {
        /// Channel name.
        channel: &'a str,
    },
    /// Leave a channel (privacy enforced).
    Unsubscribe {
        /// Channel name.
        channel: &'a str,
    },
    /// Present the admin secret.
    AdminToken {
        /// Presented secret.
        token: &'a str,
    },
    /// Publish into a channel.
    Publish {
        /// Channel name.
        channel: &'a str,
        /// Message body.
        body: &'a str,
    },
    /// Admin broadcast to every client.
    Broadcast {
        /// Message body.
        body: &'a str,
    },
    /// Admin direct message to one client.
    Message {
        /// Target client id.
        target: &'a str,
        /// Message body.
        body: &'a str,
    },
}

impl<'a> Command<'a> {
    /// Parses one inbound message. A trailing line terminator is ignored.
    ///
    /// # Errors
    ///
    /// - [`RelayError::UnknownCommand`] for an unrecognized keyword.
    /// - [`RelayError::MalformedCommand`] when a required parameter is
    ///   missing.
    pub fn parse(line: &'a str) -> Result<Self, RelayError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, Some(rest)),
            None => (line, None),
        };
        let required = || rest.ok_or_else(|| RelayError::MalformedCommand(keyword.to_string()));
        let pair = || {
            required()?
                .split_once(' ')
                .ok_or_else(|| RelayError::MalformedCommand(keyword.to_string()))
        };

        match keyword {
            "sub" => Ok(Self::Subscribe {
                channel: required()?,
            }),
            "unsub" => Ok(Self::Unsubscribe {
                channel: required()?,
            }),
            "admin-token" => Ok(Self::AdminToken { token: required()? }),
            "pub" => {
                let (channel, body) = pair()?;
                Ok(Self::Publish { channel, body })
            }
            "broadcast" => Ok(Self::Broadcast { body: required()? }),
            "message" => {
                let (target, body) = pair()?;
                Ok(Self::Message { target, body })
            }
            other => Err(RelayError::UnknownCommand(other.to_string())),
        }
    }

    /// Returns the protocol keyword of the command.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "sub",
            Self::Unsubscribe { .. } => "unsub",
            Self::AdminToken { .. } => "admin-token",
            Self::Publish { .. } => "pub",
            Self::Broadcast { .. } => "broadcast",
            Self::Message { .. } => "message",
        }
    }
}

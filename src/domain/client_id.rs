//! Type-safe client identifier.
//!
//! [`ClientId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! client identifiers cannot be confused with channel names or other
//! strings flowing through the protocol.

use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

/// Unique identifier for a connected client.
///
/// Generated by the server when a connection is accepted and immutable
/// thereafter. Used as the key in [`super::ClientRegistry`], as the
/// subscriber key inside a [`super::Channel`], and as the sender tag of
/// every delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Creates a new random `ClientId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `ClientId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsing an identifier received over the wire. Ids are matched exactly
/// as they were handed out: only the lowercase hyphenated form is
/// accepted, so braced, URN, simple or uppercase spellings of a live id
/// resolve to [`RelayError::ClientNotFound`] like any other unknown string.
impl FromStr for ClientId {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<uuid::Uuid>()
            .ok()
            .filter(|uuid| uuid.hyphenated().to_string() == s)
            .map(Self)
            .ok_or_else(|| RelayError::ClientNotFound(s.to_string()))
    }
}

impl From<uuid::Uuid> for ClientId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = ClientId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn parses_its_own_display() {
        let id = ClientId::new();
        let Ok(parsed) = id.to_string().parse::<ClientId>() else {
            panic!("display output must parse");
        };
        assert_eq!(parsed, id);
    }

    #[test]
    fn garbage_parses_to_client_not_found() {
        let err = "not-a-client".parse::<ClientId>();
        assert_eq!(
            err,
            Err(RelayError::ClientNotFound("not-a-client".to_string()))
        );
    }

    #[test]
    fn alternate_uuid_spellings_are_not_found() {
        let id = ClientId::new();
        let uuid = id.as_uuid();
        for spelling in [
            uuid.braced().to_string(),
            uuid.urn().to_string(),
            uuid.simple().to_string(),
            id.to_string().to_uppercase(),
        ] {
            assert_eq!(
                spelling.parse::<ClientId>(),
                Err(RelayError::ClientNotFound(spelling.clone()))
            );
        }
    }

    #[test]
    fn from_uuid_keeps_value() {
        let uuid = uuid::Uuid::new_v4();
        assert_eq!(*ClientId::from_uuid(uuid).as_uuid(), uuid);
    }
}

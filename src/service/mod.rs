//! Service layer: the pub/sub engine.
//!
//! [`RelayService`] owns the registries and composes the
//! [`SubscriptionManager`], [`MessageRouter`] and [`AdminAuthenticator`].
//! Socket commands are parsed into a [`Command`] and dispatched through
//! [`RelayService::execute`].

pub mod auth;
pub mod command;
pub mod relay_service;
pub mod router;
pub mod subscription;

pub use auth::{AdminAuthenticator, CredentialVerifier, StaticTokenVerifier};
pub use command::Command;
pub use relay_service::{Outcome, RelayService};
pub use router::{Delivery, MessageRouter};
pub use subscription::{Privacy, SubscriptionManager};

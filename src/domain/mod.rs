//! Domain layer: client and channel entities, outbound frames, and the
//! two process-wide registries.
//!
//! The registries are plain owned values created once at startup and
//! shared behind `Arc` through [`crate::service::RelayService`]; they live
//! until the process exits.

pub mod channel;
pub mod channel_registry;
pub mod client;
pub mod client_id;
pub mod client_registry;
pub mod frame;

pub use channel::{Channel, ChannelInfo, ChannelPolicy};
pub use channel_registry::ChannelRegistry;
pub use client::{Client, FrameSink};
pub use client_id::ClientId;
pub use client_registry::ClientRegistry;
pub use frame::{Frame, LifecycleEvent};

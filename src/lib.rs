//! # subsocket
//!
//! WebSocket publish/subscribe relay.
//!
//! Clients connect over a WebSocket, subscribe to named channels, and
//! publish text messages that are fanned out to every subscriber. Clients
//! that present the shared admin secret may also broadcast to everyone,
//! message a single client directly, and are told whenever a client
//! connects or disconnects. Channels are defined through a small
//! administrative HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)        Operators (HTTP)
//!     │                          │
//!     ├── Session (ws/)          ├── Admin handlers (api/)
//!     │                          │
//!     └──────────┬───────────────┘
//!                │
//!           RelayService (service/)
//!     ├── SubscriptionManager
//!     ├── MessageRouter
//!     └── AdminAuthenticator
//!                │
//!     ├── ClientRegistry (domain/)
//!     └── ChannelRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;

#[cfg(test)]
mod testutil;

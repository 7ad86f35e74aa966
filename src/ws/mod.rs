//! WebSocket layer: upgrade handler and per-connection session.
//!
//! The endpoint at `/socket` speaks the line-oriented relay protocol
//! described in [`crate::service::command`].

pub mod connection;
pub mod handler;

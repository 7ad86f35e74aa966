//! WebSocket connection session.
//!
//! Each accepted socket runs one [`Session`] through
//! `Connecting → Open → Closing → Closed`:
//!
//! - **Connecting → Open**: the client is registered and admins are
//!   notified (`CONNECTED`).
//! - **Open**: every inbound message is parsed and dispatched. Commands
//!   that fail for any reason are dropped without a reply and only leave a
//!   diagnostic event behind.
//! - **Open → Closing**: the peer closed the socket or a read failed.
//! - **Closing → Closed**: the client is purged from every channel and
//!   from the client registry, and admins are notified (`DISCONNECTED`).

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt, future};

use crate::domain::{Client, ClientId, FrameSink};
use crate::error::RelayError;
use crate::service::{Outcome, RelayService};

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport accepted, client not yet registered.
    Connecting,
    /// Registered and receiving commands.
    Open,
    /// Transport ended, cleanup in progress.
    Closing,
    /// Purged from both registries.
    Closed,
}

/// One client's connection as driven by the receive loop.
pub struct Session {
    relay: Arc<RelayService>,
    client: Arc<Client>,
    state: SessionState,
}

impl Session {
    /// Registers a new client writing to `sink` and moves to
    /// [`SessionState::Open`].
    pub async fn open(relay: Arc<RelayService>, sink: FrameSink) -> Self {
        tracing::debug!(state = ?SessionState::Connecting, "session starting");
        let client = relay.connect(sink).await;
        Self {
            relay,
            client,
            state: SessionState::Open,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The client behind this session.
    #[must_use]
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Identifier of the client behind this session.
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client.id()
    }

    /// Handles one inbound message. Returns the outcome when the command
    /// took effect; every failure is logged and swallowed.
    pub async fn handle(&self, text: &str) -> Option<Outcome> {
        if self.state != SessionState::Open {
            return None;
        }
        match self.relay.handle_line(&self.client, text).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::debug!(
                    client_id = %self.client.id(),
                    reason = e.reason(),
                    error = %e,
                    "command ignored"
                );
                None
            }
        }
    }

    /// Tears the session down. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closing;
        self.relay.disconnect(&self.client).await;
        if let Err(e) = self.client.close().await {
            tracing::debug!(client_id = %self.client.id(), error = %e, "outbound close failed");
        }
        self.state = SessionState::Closed;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Adapts the write half of a WebSocket into a [`FrameSink`] of text
/// frames.
#[must_use]
pub fn frame_sink(ws_tx: SplitSink<WebSocket, Message>) -> FrameSink {
    let sink = ws_tx
        .with(|frame: String| future::ready(Ok::<_, axum::Error>(Message::text(frame))))
        .sink_map_err(|e| RelayError::Transport(e.to_string()));
    Box::pin(sink)
}

/// Runs the receive loop for a single WebSocket connection until the
/// transport closes, then purges the client.
pub async fn run_connection(socket: WebSocket, relay: Arc<RelayService>) {
    let (ws_tx, mut ws_rx) = socket.split();
    let mut session = Session::open(relay, frame_sink(ws_tx)).await;
    let client_id = session.client_id();

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                session.handle(text.as_str()).await;
            }
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    session.handle(text).await;
                }
                Err(_) => {
                    tracing::debug!(%client_id, reason = "malformed", "non-utf8 binary frame ignored");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                tracing::warn!(%client_id, error = %e, "ws read failed");
                break;
            }
        }
    }

    session.close().await;
    tracing::debug!(%client_id, "ws connection closed");
}

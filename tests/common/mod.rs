//! Shared harness: boots the real app on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use subsocket::app_state::AppState;
use subsocket::server::build_app;
use subsocket::service::{RelayService, StaticTokenVerifier};

/// Admin secret of every test server.
pub const TOKEN: &str = "123456";

/// Client side of a relay socket.
pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Starts a server and returns its address.
pub async fn spawn_app() -> SocketAddr {
    let relay = RelayService::new(Arc::new(StaticTokenVerifier::new(TOKEN)));
    let app = build_app(AppState::new(relay), None);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind must succeed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener must have an address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Opens a socket to `/socket`.
pub async fn connect(addr: SocketAddr) -> Ws {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}/socket")).await else {
        panic!("socket must connect");
    };
    ws
}

/// Sends one command line.
pub async fn send(ws: &mut Ws, line: &str) {
    let Ok(()) = ws.send(Message::text(line.to_string())).await else {
        panic!("send must succeed");
    };
}

/// Waits for the next text frame.
pub async fn next_text(ws: &mut Ws) -> String {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("expected a text frame");
        };
        if let Message::Text(text) = msg {
            return text.to_string();
        }
    }
}

/// Connects, elevates, and learns the socket's own client id from the
/// echo of an admin broadcast.
///
/// Every other socket open at this point also receives the broadcast.
pub async fn connect_admin(addr: SocketAddr) -> (Ws, String) {
    let mut ws = connect(addr).await;
    send(&mut ws, &format!("admin-token {TOKEN}")).await;
    send(&mut ws, "broadcast whoami").await;
    let frame = next_text(&mut ws).await;
    let Some(id) = frame
        .strip_prefix("__broadcast ")
        .and_then(|rest| rest.strip_suffix(" whoami"))
    else {
        panic!("unexpected frame: {frame}");
    };
    (ws, id.to_string())
}

/// Reads the id out of a `__notify <id> <event>` frame.
pub async fn expect_notify(ws: &mut Ws, event: &str) -> String {
    let frame = next_text(ws).await;
    let Some(id) = frame
        .strip_prefix("__notify ")
        .and_then(|rest| rest.strip_suffix(&format!(" {event}")))
    else {
        panic!("unexpected frame: {frame}");
    };
    id.to_string()
}

/// Publishes a marker on `channel` and waits for its echo, proving every
/// earlier command from this socket has been processed.
pub async fn sync(ws: &mut Ws, channel: &str, marker: &str) {
    send(ws, &format!("pub {channel} {marker}")).await;
    let frame = next_text(ws).await;
    assert!(
        frame.starts_with(&format!("{channel} ")) && frame.ends_with(&format!(" {marker}")),
        "unexpected frame: {frame}"
    );
}

/// Issues an authorized admin API GET and returns status and body.
pub async fn admin_get(addr: SocketAddr, path_and_query: &str) -> (u16, String) {
    let Ok(response) = reqwest::Client::new()
        .get(format!("http://{addr}{path_and_query}"))
        .header("Admin-Token", TOKEN)
        .send()
        .await
    else {
        panic!("request must complete");
    };
    let status = response.status().as_u16();
    let Ok(body) = response.text().await else {
        panic!("body must be readable");
    };
    (status, body)
}

/// Like [`admin_get`], parsing the body as JSON.
pub async fn admin_json(addr: SocketAddr, path_and_query: &str) -> serde_json::Value {
    let (status, body) = admin_get(addr, path_and_query).await;
    assert_eq!(status, 200, "body: {body}");
    let Ok(value) = serde_json::from_str(&body) else {
        panic!("body must be json: {body}");
    };
    value
}

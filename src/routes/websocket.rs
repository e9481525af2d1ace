use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinSet,
};

use crate::{auth::SessionContext, core::Subscription, state::AppState};

/// Largest client frame accepted before the socket is closed
const MAX_CLIENT_MESSAGE_BYTES: usize = 1024;

/// WebSocket endpoint delivering room broadcasts to the caller
///
/// # Returns
///
/// WebSocket upgrade response, or 401 for an anonymous session
///
/// # Flow
///
/// 1. Resolve the caller's session from the cookie
/// 2. Collect receivers for every room the session joined (via re-login)
/// 3. Forward each room's messages to the socket until either side closes
///    or the session logs out
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ctx: SessionContext,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !ctx.session.is_authenticated() {
        return Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string()));
    }

    let subscription = state.broadcaster.listen(&ctx.id).await;
    tracing::info!(
        "WebSocket accepted: user={:?} rooms={}",
        ctx.session.usr,
        subscription.rooms.len()
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, subscription)))
}

/// Pump room messages out and client frames in until the connection ends
/// or the session logs out
async fn handle_socket(socket: WebSocket, subscription: Subscription) {
    let (mut sender, mut receiver) = socket.split();

    // Fan all rooms into one queue for the single socket writer
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut relay = tokio::spawn(forward_rooms(subscription, tx));

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        // Queue closed: the session was revoked
        let _ = sender.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if text.len() > MAX_CLIENT_MESSAGE_BYTES {
                        tracing::warn!("Message too large from client: {} bytes", text.len());
                        break;
                    }
                    tracing::debug!("Received from client: {}", text);
                }
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => {
                    // Axum answers protocol pings itself
                }
                Message::Binary(_) => {
                    tracing::warn!("Unexpected binary message from client");
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    relay.abort();
    let _ = (&mut relay).await;

    tracing::debug!("WebSocket connection closed");
}

/// Copy every room into the socket queue until the subscription is revoked
///
/// Returning drops the queue's last sender, which ends the socket writer.
async fn forward_rooms(subscription: Subscription, tx: mpsc::UnboundedSender<String>) {
    let Subscription { rooms, mut revoked } = subscription;

    let mut forwarders = JoinSet::new();
    for rx in rooms {
        forwarders.spawn(forward_room(rx, tx.clone()));
    }
    drop(tx);

    // Err means the signal's sender is gone, which also only happens on revoke
    let _ = revoked.wait_for(|gone| *gone).await;
    forwarders.shutdown().await;
    tracing::debug!("Socket subscription revoked");
}

/// Copy one room's broadcasts into the socket queue
async fn forward_room(mut rx: broadcast::Receiver<String>, tx: mpsc::UnboundedSender<String>) {
    loop {
        match rx.recv().await {
            Ok(text) => {
                if tx.send(text).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Socket lagged behind room by {} messages", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

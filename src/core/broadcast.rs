use axum::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::{broadcast, watch, RwLock};

use super::{game_room, BroadcastService, BROADCAST_CAPACITY};

/// What a socket needs to follow one session's rooms
#[derive(Debug)]
pub struct Subscription {
    /// One receiver per room the session belonged to when it connected
    pub rooms: Vec<broadcast::Receiver<String>>,
    /// Flips to true, or closes, once the session leaves all its rooms
    pub revoked: watch::Receiver<bool>,
}

/// Room-based fan-out over tokio broadcast channels
///
/// Each room owns one channel. Sessions are members of rooms; a WebSocket
/// opened by a session listens on every room the session belongs to until
/// the session's revocation signal fires.
#[derive(Debug, Default)]
pub struct Broadcaster {
    rooms: RwLock<HashMap<String, broadcast::Sender<String>>>,
    memberships: RwLock<HashMap<String, HashSet<String>>>,
    revocations: RwLock<HashMap<String, watch::Sender<bool>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms the session currently belongs to
    pub async fn rooms_of(&self, session_id: &str) -> HashSet<String> {
        self.memberships
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn sender(&self, room: &str) -> broadcast::Sender<String> {
        if let Some(tx) = self.rooms.read().await.get(room) {
            return tx.clone();
        }

        self.rooms
            .write()
            .await
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .clone()
    }

    async fn revocation(&self, session_id: &str) -> watch::Receiver<bool> {
        self.revocations
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| watch::channel(false).0)
            .subscribe()
    }
}

#[async_trait]
impl BroadcastService for Broadcaster {
    async fn subscribe(&self, session_id: &str, game_id: u64) {
        self.join(session_id, &game_room(game_id)).await;
    }

    async fn join(&self, session_id: &str, room: &str) {
        self.memberships
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .insert(room.to_string());
        tracing::debug!("Session joined room={}", room);
    }

    async fn leave_all(&self, session_id: &str) {
        self.memberships.write().await.remove(session_id);

        if let Some(tx) = self.revocations.write().await.remove(session_id) {
            tx.send_replace(true);
            tracing::debug!("Revoked {} open socket(s)", tx.receiver_count());
        }
    }

    async fn publish(&self, room: &str, message: Value) -> usize {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize message for room={}: {}", room, e);
                return 0;
            }
        };

        // No channel or no receivers is not an error; nobody is listening yet
        match self.rooms.read().await.get(room) {
            Some(tx) => tx.send(text).unwrap_or(0),
            None => 0,
        }
    }

    async fn listen(&self, session_id: &str) -> Subscription {
        let revoked = self.revocation(session_id).await;

        let mut rooms = Vec::new();
        for room in self.rooms_of(session_id).await {
            rooms.push(self.sender(&room).await.subscribe());
        }

        Subscription { rooms, revoked }
    }

    async fn prune(&self) -> usize {
        let mut pruned = 0;

        self.rooms.write().await.retain(|_, tx| {
            let keep = tx.receiver_count() > 0;
            pruned += usize::from(!keep);
            keep
        });
        self.revocations
            .write()
            .await
            .retain(|_, tx| tx.receiver_count() > 0);

        pruned
    }
}

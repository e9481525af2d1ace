use axum::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use super::{SessionStore, SESSION_TTL_SECONDS};

/// Per-client server-side state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
    /// Id of the authenticated user
    pub usr: Option<u64>,
    /// Id of the game the user is seated in
    pub game: Option<u64>,
    /// Seat number within that game
    pub p_num: Option<u8>,
}

impl Session {
    /// Mark the session as belonging to `user_id`
    pub fn authenticate(&mut self, user_id: u64) {
        self.logged_in = true;
        self.usr = Some(user_id);
    }

    /// Whether the session claims an authenticated user
    pub fn is_authenticated(&self) -> bool {
        self.logged_in && self.usr.is_some()
    }

    /// Forget everything, back to an anonymous session
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// In-memory session table
///
/// A session lives as long as its cookie: [`SESSION_TTL_SECONDS`] after the
/// last write. Expired entries read as absent until a sweep removes them.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    written_at: OffsetDateTime,
}

impl StoredSession {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now - self.written_at > Duration::seconds(SESSION_TTL_SECONDS as i64)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for SessionRegistry {
    async fn read(&self, session_id: &str) -> anyhow::Result<Option<Session>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .filter(|stored| !stored.is_expired(now))
            .map(|stored| stored.session.clone()))
    }

    async fn write(&self, session_id: &str, session: Session) -> anyhow::Result<()> {
        self.sessions.write().await.insert(
            session_id.to_string(),
            StoredSession {
                session,
                written_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> anyhow::Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn sweep_expired(&self) -> anyhow::Result<Vec<String>> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, stored)| stored.is_expired(now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        Ok(expired)
    }
}

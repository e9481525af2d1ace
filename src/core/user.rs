use axum::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::UserStore;

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Sequential identifier, starting at 1
    pub id: u64,
    /// Unique login name
    pub username: String,
    /// Argon2 PHC string; the plaintext is never stored
    #[serde(skip_serializing)]
    pub encrypted_password: String,
    pub email: Option<String>,
    /// Seat number in the user's current game
    pub p_num: Option<u8>,
    /// Id of the user's current game
    pub game: Option<u64>,
    pub created_at: OffsetDateTime,
}

/// Returned by [`UserStore::create`] when the username already exists
#[derive(Debug, thiserror::Error)]
#[error("username {0:?} is already registered")]
pub struct UsernameTaken(pub String);

/// In-memory user table
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<UserTable>,
}

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<u64, User>,
    last_id: u64,
}

impl UserTable {
    fn by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which game and seat a user currently holds
    ///
    /// Called by the game side when it seats a player; the account endpoints
    /// only read `game` and `p_num`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist
    pub async fn assign_game(&self, user_id: u64, game_id: u64, p_num: u8) -> Result<(), String> {
        let mut table = self.inner.write().await;
        let user = table
            .users
            .get_mut(&user_id)
            .ok_or_else(|| format!("No user with id {}", user_id))?;
        user.game = Some(game_id);
        user.p_num = Some(p_num);
        Ok(())
    }

    /// Delete a user record, for account removal by an operator
    ///
    /// # Returns
    ///
    /// True if a record was removed
    pub async fn remove(&self, user_id: u64) -> bool {
        self.inner.write().await.users.remove(&user_id).is_some()
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for UserDirectory {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.by_username(username).cloned())
    }

    async fn find_by_id(&self, id: u64) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn create(&self, username: &str, encrypted_password: &str) -> anyhow::Result<User> {
        let mut table = self.inner.write().await;

        // Uniqueness is re-checked under the write lock
        if table.by_username(username).is_some() {
            return Err(UsernameTaken(username.to_string()).into());
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            username: username.to_string(),
            encrypted_password: encrypted_password.to_string(),
            email: None,
            p_num: None,
            game: None,
            created_at: OffsetDateTime::now_utc(),
        };
        table.users.insert(user.id, user.clone());

        tracing::debug!("Created user id={} username={}", user.id, user.username);
        Ok(user)
    }

    async fn update_email(
        &self,
        username: &str,
        email: Option<String>,
    ) -> anyhow::Result<Option<User>> {
        let mut table = self.inner.write().await;
        let updated = table
            .users
            .values_mut()
            .find(|u| u.username == username)
            .map(|user| {
                user.email = email;
                user.clone()
            });
        Ok(updated)
    }
}

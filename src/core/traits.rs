use axum::async_trait;
use serde_json::Value;
use super::{Game, Session, Subscription, User};

/// Persistence for User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user registered under `username`
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Find a user by id
    async fn find_by_id(&self, id: u64) -> anyhow::Result<Option<User>>;

    /// Create a user from an already-encrypted password
    ///
    /// # Errors
    ///
    /// Fails with [`UsernameTaken`](super::UsernameTaken) if the username is taken
    async fn create(&self, username: &str, encrypted_password: &str) -> anyhow::Result<User>;

    /// Set the email of the user matching `username`
    ///
    /// # Returns
    ///
    /// The updated user, or None if no user matched
    async fn update_email(
        &self,
        username: &str,
        email: Option<String>,
    ) -> anyhow::Result<Option<User>>;
}

/// Password hashing and verification
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password into a self-describing encrypted string
    async fn hash(&self, password: &str) -> anyhow::Result<String>;

    /// Check a plaintext password against an encrypted one
    ///
    /// # Returns
    ///
    /// Ok(false) on mismatch, Err only when verification itself broke
    async fn verify(&self, password: &str, encrypted_password: &str) -> anyhow::Result<bool>;
}

/// Game lookup for the account endpoints
#[async_trait]
pub trait GameService: Send + Sync {
    /// Resolve a game with its players filled in
    ///
    /// # Errors
    ///
    /// Fails when `game_id` is None or no such game exists
    async fn populate(&self, game_id: Option<u64>) -> anyhow::Result<Game>;

    /// Look a game up by id
    async fn find(&self, game_id: u64) -> anyhow::Result<Option<Game>>;
}

/// Server-side session storage keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn read(&self, session_id: &str) -> anyhow::Result<Option<Session>>;

    async fn write(&self, session_id: &str, session: Session) -> anyhow::Result<()>;

    async fn clear(&self, session_id: &str) -> anyhow::Result<()>;

    /// Remove sessions whose lifetime has run out
    ///
    /// # Returns
    ///
    /// Ids of the removed sessions
    async fn sweep_expired(&self) -> anyhow::Result<Vec<String>>;
}

/// Room-based publish/subscribe to connected clients
#[async_trait]
pub trait BroadcastService: Send + Sync {
    /// Subscribe a session to update notifications for one game
    async fn subscribe(&self, session_id: &str, game_id: u64);

    /// Add a session to a named room
    async fn join(&self, session_id: &str, room: &str);

    /// Drop every room membership a session holds and revoke its open
    /// subscriptions
    async fn leave_all(&self, session_id: &str);

    /// Send a message to everyone listening on `room`
    ///
    /// # Returns
    ///
    /// Number of receivers the message reached
    async fn publish(&self, room: &str, message: Value) -> usize;

    /// Receivers for every room the session is a member of, plus the signal
    /// that [`leave_all`](Self::leave_all) fires for them
    async fn listen(&self, session_id: &str) -> Subscription;

    /// Forget room channels nobody is listening on
    ///
    /// # Returns
    ///
    /// Number of rooms dropped
    async fn prune(&self) -> usize;
}

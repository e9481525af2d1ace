use std::sync::Arc;

use crate::{
    auth::Argon2Hasher,
    core::{
        BroadcastService, Broadcaster, GameRegistry, GameService, PasswordService,
        SessionRegistry, SessionStore, UserDirectory, UserStore,
    },
};

/// Shared application state: the collaborators every handler talks to
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub passwords: Arc<dyn PasswordService>,
    pub games: Arc<dyn GameService>,
    pub sessions: Arc<dyn SessionStore>,
    pub broadcaster: Arc<dyn BroadcastService>,
    /// HMAC key for session cookies
    pub secret_key: String,
    /// Whether session cookies carry the Secure attribute
    pub secure_cookies: bool,
}

impl AppState {
    /// State backed entirely by the in-memory collaborators
    pub fn in_memory(secret_key: String, passwords: Argon2Hasher) -> Self {
        Self {
            users: Arc::new(UserDirectory::new()),
            passwords: Arc::new(passwords),
            games: Arc::new(GameRegistry::new()),
            sessions: Arc::new(SessionRegistry::new()),
            broadcaster: Arc::new(Broadcaster::new()),
            secret_key,
            secure_cookies: true,
        }
    }
}

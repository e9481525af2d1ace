/// Number of seats in a game; a game is only playable once both are taken
pub const PLAYERS_PER_GAME: usize = 2;

/// Broadcast room every re-logged-in client joins to hear about game lists
pub const GAME_LIST_ROOM: &str = "GameList";

/// Buffered messages per broadcast room before slow receivers start lagging
pub const BROADCAST_CAPACITY: usize = 100;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "sid";

/// Lifetime of a session token and its cookie
pub const SESSION_TTL_SECONDS: u64 = 86400; // 24 hours

/// Username length limits
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Upper bound on password input, well above any sane passphrase
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// RFC 5321 path limit
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Name of the broadcast room for a game's updates
pub fn game_room(game_id: u64) -> String {
    format!("game_{}", game_id)
}

/// How often expired sessions and idle rooms are swept
pub const SWEEP_INTERVAL_SECONDS: u64 = 300; // 5 minutes

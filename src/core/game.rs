use axum::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{GameService, User, PLAYERS_PER_GAME};

/// A user's seat at a game table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub user_id: u64,
    pub username: String,
    /// Zero-based seat number
    pub p_num: u8,
}

/// A game as seen by the account endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: u64,
    pub name: String,
    /// Seated players in seat order
    pub players: Vec<Seat>,
    /// Description of the most recent game event, re-sent on reconnect
    pub last_event: Value,
    pub created_at: OffsetDateTime,
}

impl Game {
    fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            players: Vec::new(),
            last_event: Value::Object(Default::default()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Whether both seats are taken
    pub fn is_full(&self) -> bool {
        self.players.len() >= PLAYERS_PER_GAME
    }
}

/// In-memory registry of games
///
/// The account endpoints only read games through [`GameService`]. Creating
/// games, seating players and recording events is the game side's surface;
/// nothing in the HTTP layer calls it, so a deployment that wants reLogin to
/// succeed seeds games through these methods.
#[derive(Debug, Default)]
pub struct GameRegistry {
    inner: RwLock<GameTable>,
}

#[derive(Debug, Default)]
struct GameTable {
    games: HashMap<u64, Game>,
    last_id: u64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty game
    ///
    /// # Returns
    ///
    /// The id of the new game
    pub async fn create_game(&self, name: &str) -> u64 {
        let mut table = self.inner.write().await;
        table.last_id += 1;
        let id = table.last_id;
        table.games.insert(id, Game::new(id, name.to_string()));
        id
    }

    /// Seat a user in the next free seat
    ///
    /// # Returns
    ///
    /// The seat number given to the user
    ///
    /// # Errors
    ///
    /// Returns an error if the game is missing, full, or already seats the user
    pub async fn seat_player(&self, game_id: u64, user: &User) -> Result<u8, String> {
        let mut table = self.inner.write().await;
        let game = table
            .games
            .get_mut(&game_id)
            .ok_or_else(|| "Game not found".to_string())?;

        if game.players.iter().any(|seat| seat.user_id == user.id) {
            return Err("Player is already seated".to_string());
        }
        if game.is_full() {
            return Err("Game is full".to_string());
        }

        let p_num = game.players.len() as u8;
        game.players.push(Seat {
            user_id: user.id,
            username: user.username.clone(),
            p_num,
        });
        Ok(p_num)
    }

    /// Replace the stored description of the latest game event
    pub async fn record_event(&self, game_id: u64, event: Value) -> Result<(), String> {
        let mut table = self.inner.write().await;
        let game = table
            .games
            .get_mut(&game_id)
            .ok_or_else(|| "Game not found".to_string())?;
        game.last_event = event;
        Ok(())
    }
}

#[async_trait]
impl GameService for GameRegistry {
    async fn populate(&self, game_id: Option<u64>) -> anyhow::Result<Game> {
        let game_id = game_id.ok_or_else(|| anyhow::anyhow!("user is not in a game"))?;
        self.find(game_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("game {} not found", game_id))
    }

    async fn find(&self, game_id: u64) -> anyhow::Result<Option<Game>> {
        Ok(self.inner.read().await.games.get(&game_id).cloned())
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Game;

/// Body of the session status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    /// A logged-in session whose user still exists
    Authenticated {
        id: u64,
        username: String,
        authenticated: bool,
        /// Only set when the session's game has both seats taken
        #[serde(rename = "gameId")]
        game_id: Option<u64>,
    },
    /// Anything else; serializes as exactly `{"authenticated": false}`
    Anonymous { authenticated: bool },
}

impl StatusResponse {
    pub fn anonymous() -> Self {
        StatusResponse::Anonymous {
            authenticated: false,
        }
    }
}

/// Build the `updated` event published to a game's room on re-login
///
/// The game's last event is flattened into `data`, alongside the full game.
pub fn game_updated_event(game: &Game) -> Value {
    let mut data = match &game.last_event {
        Value::Object(fields) => fields.clone(),
        _ => serde_json::Map::new(),
    };
    data.insert(
        "game".to_string(),
        serde_json::to_value(game).unwrap_or(Value::Null),
    );

    serde_json::json!({
        "type": "game",
        "verb": "updated",
        "id": game.id,
        "data": data,
    })
}

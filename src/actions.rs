use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::TerritoryId;
use crate::errors::ProtocolError;
use crate::game::GameState;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for rooms (one match per room)
pub type RoomId = String;

/// Inbound action envelope. Humans and bots send exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    FinishTurn {
        player_id: PlayerId,
    },
    Attack {
        player_id: PlayerId,
        from: TerritoryId,
        to: TerritoryId,
        attacking_armies: u32,
    },
    TroopAssign {
        player_id: PlayerId,
        territory_id: TerritoryId,
    },
    TroopMove {
        player_id: PlayerId,
        from: TerritoryId,
        to: TerritoryId,
        moving_armies: u32,
    },
    Trade {
        player_id: PlayerId,
        card_1: TerritoryId,
        card_2: TerritoryId,
        card_3: TerritoryId,
    },
}

impl ClientAction {
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::serialization_failed(e.to_string()))
    }

    pub fn player_id(&self) -> &str {
        match self {
            ClientAction::FinishTurn { player_id }
            | ClientAction::Attack { player_id, .. }
            | ClientAction::TroopAssign { player_id, .. }
            | ClientAction::TroopMove { player_id, .. }
            | ClientAction::Trade { player_id, .. } => player_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientAction::FinishTurn { .. } => "finish_turn",
            ClientAction::Attack { .. } => "attack",
            ClientAction::TroopAssign { .. } => "troop_assign",
            ClientAction::TroopMove { .. } => "troop_move",
            ClientAction::Trade { .. } => "trade",
        }
    }
}

/// One human-readable line of the match log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        LogEntry {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Outbound envelope broadcast after every event
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    Update {
        #[serde(rename = "gameState")]
        game_state: &'a GameState,
        log: &'a [LogEntry],
    },
}

impl ServerMessage<'_> {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::serialization_failed(e.to_string()))
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::{PlayerId, RoomId};
use crate::board::TerritoryId;

/// Top-level error type for the whole server
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WarError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rule violations reported by the game state. None of them mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not player's turn: current={current_player:?}, attempted={attempted_player}")]
    NotPlayerTurn {
        current_player: Option<PlayerId>,
        attempted_player: PlayerId,
    },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: PlayerId },

    #[error("Territory not in this match: {territory:?}")]
    TerritoryNotFound { territory: TerritoryId },

    #[error("Player {player_id} does not own {territory:?}")]
    NotOwner {
        player_id: PlayerId,
        territory: TerritoryId,
    },

    #[error("Player {player_id} cannot attack own territory {territory:?}")]
    OwnTerritory {
        player_id: PlayerId,
        territory: TerritoryId,
    },

    #[error("Territories {from:?} and {to:?} are not adjacent")]
    NotAdjacent { from: TerritoryId, to: TerritoryId },

    #[error("Invalid army count {armies}: {rule}")]
    InvalidArmyCount { armies: u32, rule: String },

    #[error("Not enough armies in {territory:?}: has {available}, needs more than {requested}")]
    InsufficientArmies {
        territory: TerritoryId,
        available: u32,
        requested: u32,
    },

    #[error("Player {player_id} has no reinforcements left")]
    NoReinforcements { player_id: PlayerId },

    #[error("Card {card:?} is not in the hand of {player_id}")]
    CardNotInHand {
        player_id: PlayerId,
        card: TerritoryId,
    },

    #[error("A trade needs three distinct cards")]
    DuplicateCards,

    #[error("Traded cards must share the same shape")]
    MismatchedShapes,

    #[error("The match has no players")]
    NoPlayers,
}

/// Structural problems with inbound messages or channels.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("Message deserialization failed: {details}")]
    DeserializationFailed { details: String },

    #[error("Message serialization failed: {details}")]
    SerializationFailed { details: String },

    #[error("Game {room_id} is closed")]
    GameClosed { room_id: RoomId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryError {
    #[error("Game not found: {room_id}")]
    GameNotFound { room_id: RoomId },
}

/// Result type aliases for convenience
pub type WarResult<T> = Result<T, WarError>;
pub type GameResult<T> = Result<T, GameError>;
pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl GameError {
    pub fn not_player_turn(current: Option<&PlayerId>, attempted: impl Into<PlayerId>) -> Self {
        Self::NotPlayerTurn {
            current_player: current.cloned(),
            attempted_player: attempted.into(),
        }
    }

    pub fn player_not_found(player_id: impl Into<PlayerId>) -> Self {
        Self::PlayerNotFound {
            player_id: player_id.into(),
        }
    }

    pub fn not_owner(player_id: impl Into<PlayerId>, territory: TerritoryId) -> Self {
        Self::NotOwner {
            player_id: player_id.into(),
            territory,
        }
    }

    pub fn invalid_army_count(armies: u32, rule: impl Into<String>) -> Self {
        Self::InvalidArmyCount {
            armies,
            rule: rule.into(),
        }
    }
}

impl ProtocolError {
    pub fn deserialization_failed(details: impl Into<String>) -> Self {
        Self::DeserializationFailed {
            details: details.into(),
        }
    }

    pub fn serialization_failed(details: impl Into<String>) -> Self {
        Self::SerializationFailed {
            details: details.into(),
        }
    }

    pub fn game_closed(room_id: impl Into<RoomId>) -> Self {
        Self::GameClosed {
            room_id: room_id.into(),
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::deserialization_failed(err.to_string())
    }
}

impl From<String> for WarError {
    fn from(msg: String) -> Self {
        WarError::Internal(msg)
    }
}

impl From<&str> for WarError {
    fn from(msg: &str) -> Self {
        WarError::Internal(msg.to_string())
    }
}

// War Server Library
//
// Match engine for a War/Risk style board game: static board data, the rules
// engine, the per-match actor, bots and the registry that owns live matches.

// Static game data
pub mod board;
pub mod objectives;

// Rules
pub mod battle;
pub mod deck;
pub mod game;

// Runtime
pub mod actions;
pub mod actor;
pub mod bot;
pub mod config;
pub mod errors;
pub mod ordered_hashmap;
pub mod registry;
pub mod websocket;

pub use crate::actions::{ClientAction, LogEntry, PlayerId, RoomId, ServerMessage};
pub use crate::actor::{ClientHandle, GameActor, GameEvent, GameHandle};
pub use crate::board::{Region, Shape, TerritoryId};
pub use crate::config::{GameConfig, ServerConfig};
pub use crate::errors::{GameError, ProtocolError, RegistryError, WarError, WarResult};
pub use crate::game::{GameState, Player, Territory};
pub use crate::registry::{GameRegistry, InMemoryRoster, RosterEntry, RosterProvider};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

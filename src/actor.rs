use std::collections::HashMap;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::actions::{ClientAction, LogEntry, PlayerId, RoomId, ServerMessage};
use crate::board::TerritoryId;
use crate::bot;
use crate::config::GameConfig;
use crate::errors::{GameError, ProtocolError, ProtocolResult};
use crate::game::{ActionEffect, GameState, TurnStart};

pub type ClientId = String;

/// Outbound side of one connected client
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: ClientId,
    pub player_id: PlayerId,
    mailbox: mpsc::Sender<String>,
}

impl ClientHandle {
    /// New client with a bounded mailbox; the receiver feeds the socket
    pub fn new(player_id: impl Into<PlayerId>, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (mailbox, receiver) = mpsc::channel(capacity.max(1));
        let handle = ClientHandle {
            id: format!("conn_{}", Uuid::new_v4()),
            player_id: player_id.into(),
            mailbox,
        };
        (handle, receiver)
    }
}

pub enum GameEvent {
    Register(ClientHandle),
    Unregister(ClientId),
    /// Raw JSON action, from a socket or a bot
    Inbound(String),
    Snapshot(oneshot::Sender<GameState>),
    Shutdown,
}

/// Cheap, cloneable address of a running match
#[derive(Debug, Clone)]
pub struct GameHandle {
    room_id: RoomId,
    sender: mpsc::Sender<GameEvent>,
}

impl GameHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, event: GameEvent) -> ProtocolResult<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| ProtocolError::game_closed(self.room_id.as_str()))
    }

    pub async fn register(&self, client: ClientHandle) -> ProtocolResult<()> {
        self.send(GameEvent::Register(client)).await
    }

    pub async fn unregister(&self, client_id: ClientId) -> ProtocolResult<()> {
        self.send(GameEvent::Unregister(client_id)).await
    }

    pub async fn submit_raw(&self, raw: impl Into<String>) -> ProtocolResult<()> {
        self.send(GameEvent::Inbound(raw.into())).await
    }

    /// Serializes the action to the client wire shape before queueing it
    pub async fn submit(&self, action: &ClientAction) -> ProtocolResult<()> {
        self.submit_raw(action.to_json()?).await
    }

    /// State as of every event queued before this call
    pub async fn snapshot(&self) -> ProtocolResult<GameState> {
        let (reply, response) = oneshot::channel();
        self.send(GameEvent::Snapshot(reply)).await?;
        response
            .await
            .map_err(|_| ProtocolError::game_closed(self.room_id.as_str()))
    }

    pub async fn shutdown(&self) -> ProtocolResult<()> {
        self.send(GameEvent::Shutdown).await
    }
}

/// Single owner of a match's state. Everything that touches the state goes
/// through its queue, one event at a time.
pub struct GameActor {
    state: GameState,
    log: Vec<LogEntry>,
    clients: HashMap<ClientId, ClientHandle>,
    inbox: mpsc::Receiver<GameEvent>,
    myself: mpsc::WeakSender<GameEvent>,
    config: GameConfig,
    rng: XorShiftRng,
}

impl GameActor {
    /// Starts the actor task and returns its handle
    pub fn spawn(state: GameState, config: GameConfig, rng: XorShiftRng) -> (GameHandle, JoinHandle<()>) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let handle = GameHandle {
            room_id: state.room_id.clone(),
            sender,
        };

        let actor = GameActor {
            state,
            log: Vec::new(),
            clients: HashMap::new(),
            inbox,
            myself: handle.sender.downgrade(),
            config,
            rng,
        };
        let task = tokio::spawn(actor.run());
        (handle, task)
    }

    async fn run(mut self) {
        log::info!("🎲 Game actor started for room {}", self.state.room_id);

        while let Some(event) = self.inbox.recv().await {
            match event {
                GameEvent::Register(client) => self.handle_register(client),
                GameEvent::Unregister(client_id) => {
                    self.handle_unregister(&client_id);
                    if self.clients.is_empty() && self.config.teardown_when_empty {
                        log::info!("Room {} is empty, stopping game", self.state.room_id);
                        break;
                    }
                }
                GameEvent::Inbound(raw) => {
                    self.handle_inbound(&raw);
                    self.broadcast();
                }
                GameEvent::Snapshot(reply) => {
                    let _ = reply.send(self.state.clone());
                }
                GameEvent::Shutdown => {
                    log::info!("Shutdown requested for room {}", self.state.room_id);
                    break;
                }
            }
        }

        // Dropping the handles closes every client mailbox
        self.clients.clear();
        log::info!("🏁 Game actor stopped for room {}", self.state.room_id);
    }

    fn handle_register(&mut self, client: ClientHandle) {
        log::info!(
            "➕ Client {} ({}) joined room {}",
            client.id,
            client.player_id,
            self.state.room_id
        );
        match self.encode_update() {
            Some(json) => {
                if Self::deliver(&client, json).is_err() {
                    log::warn!("Client {} could not take the initial state", client.id);
                    return;
                }
            }
            None => return,
        }
        self.clients.insert(client.id.clone(), client);
        self.broadcast();
    }

    fn handle_unregister(&mut self, client_id: &str) {
        if self.clients.remove(client_id).is_some() {
            log::info!("➖ Client {} left room {}", client_id, self.state.room_id);
            self.broadcast();
        }
    }

    fn handle_inbound(&mut self, raw: &str) {
        let action = match ClientAction::parse(raw) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("Dropping malformed message in room {}: {}", self.state.room_id, e);
                return;
            }
        };

        match self.state.apply(&mut self.rng, &action) {
            Ok(effect) => {
                if let Some(line) = self.describe(action.player_id(), &effect) {
                    self.log.push(LogEntry::now(line));
                }
                if let ActionEffect::TurnPassed(turn) = effect {
                    self.on_turn_passed(turn);
                }
            }
            Err(e) => self.reject(&action, e),
        }
    }

    fn reject(&self, action: &ClientAction, error: GameError) {
        log::info!(
            "Rejected {} from {} in room {}: {}",
            action.kind(),
            action.player_id(),
            self.state.room_id,
            error
        );
    }

    fn on_turn_passed(&mut self, turn: TurnStart) {
        log::debug!(
            "Turn {} goes to {} with {} reinforcements",
            self.state.turn_number,
            turn.player_id,
            turn.reinforcements
        );
        if !turn.is_bot {
            return;
        }
        // Only live handles keep the queue open; a match nobody holds gets no more bot turns
        let Some(sender) = self.myself.upgrade() else {
            return;
        };
        let handle = GameHandle {
            room_id: self.state.room_id.clone(),
            sender,
        };
        let rng = XorShiftRng::seed_from_u64(self.rng.gen());
        bot::spawn_turn(handle, turn.player_id, self.config.clone(), rng, Duration::ZERO);
    }

    /// Localized line for the match log
    fn describe(&self, player_id: &str, effect: &ActionEffect) -> Option<String> {
        let player = &self.state.player(player_id)?.name;
        let name = |id: TerritoryId| self.state.territory(id).map(|t| t.name.as_str()).unwrap_or_default();

        let line = match effect {
            ActionEffect::TurnPassed(_) => format!("{player} finalizou o turno."),
            ActionEffect::Deployed { territory } => {
                format!("{player} posicionou 1 exército em {}.", name(*territory))
            }
            ActionEffect::Attacked {
                from,
                to,
                armies,
                report,
            } => {
                let outcome = if report.captured { "com sucesso" } else { "e perdeu" };
                format!(
                    "{player} atacou de {} para {} com {armies} exércitos {outcome}.",
                    name(*from),
                    name(*to)
                )
            }
            ActionEffect::Moved { from, to, armies } => format!(
                "{player} moveu {armies} exércitos de {} para {}.",
                name(*from),
                name(*to)
            ),
            ActionEffect::Traded { reward } => {
                format!("{player} trocou cartas e recebeu {reward} exercitos.")
            }
        };
        Some(line)
    }

    fn encode_update(&self) -> Option<String> {
        let message = ServerMessage::Update {
            game_state: &self.state,
            log: &self.log,
        };
        match message.to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("❌ Failed to encode state for room {}: {}", self.state.room_id, e);
                None
            }
        }
    }

    fn deliver(client: &ClientHandle, json: String) -> Result<(), TrySendError<String>> {
        client.mailbox.try_send(json)
    }

    /// Pushes the current state to every client without waiting on any of them
    fn broadcast(&mut self) {
        let Some(json) = self.encode_update() else {
            return;
        };

        let mut dropped = Vec::new();
        for client in self.clients.values() {
            match Self::deliver(client, json.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!(
                        "Client {} in room {} is not keeping up, dropping it",
                        client.id,
                        self.state.room_id
                    );
                    dropped.push(client.id.clone());
                }
                Err(TrySendError::Closed(_)) => dropped.push(client.id.clone()),
            }
        }

        for client_id in dropped {
            self.clients.remove(&client_id);
        }
    }
}

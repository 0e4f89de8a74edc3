use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::actions::{PlayerId, RoomId};
use crate::actor::{GameActor, GameHandle};
use crate::bot;
use crate::config::GameConfig;
use crate::errors::{RegistryError, WarResult};
use crate::game::{GameState, Player, TurnStart};

pub const PLAYER_COLORS: [&str; 6] = ["#FF0000", "#0066FF", "#00CC00", "#FFD700", "#9933FF", "#FF6600"];

/// A human seated in a room before the match starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub name: String,
}

/// Where the registry learns who sits in a room
#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn roster(&self, room_id: &str) -> Vec<RosterEntry>;
}

#[derive(Debug, Default)]
pub struct InMemoryRoster {
    rooms: RwLock<HashMap<RoomId, Vec<RosterEntry>>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a player; seating the same id twice keeps the first seat
    pub async fn join(&self, room_id: &str, entry: RosterEntry) {
        let mut rooms = self.rooms.write().await;
        let seats = rooms.entry(room_id.to_string()).or_default();
        if !seats.iter().any(|seat| seat.player_id == entry.player_id) {
            seats.push(entry);
        }
    }
}

#[async_trait]
impl RosterProvider for InMemoryRoster {
    async fn roster(&self, room_id: &str) -> Vec<RosterEntry> {
        self.rooms.read().await.get(room_id).cloned().unwrap_or_default()
    }
}

fn match_rng(config: &GameConfig) -> XorShiftRng {
    match config.seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_entropy(),
    }
}

/// Seats the humans, pads with bots up to `min_players` and deals the board
pub fn setup_match<R: Rng + ?Sized>(
    room_id: &str,
    humans: &[RosterEntry],
    config: &GameConfig,
    rng: &mut R,
) -> WarResult<(GameState, TurnStart)> {
    let mut state = GameState::new(room_id);

    for (i, entry) in humans.iter().enumerate() {
        let color = PLAYER_COLORS[i % PLAYER_COLORS.len()];
        state.add_player(Player::new(entry.player_id.clone(), entry.name.clone(), color, false));
    }

    let bots = config.min_players.saturating_sub(humans.len());
    for i in 0..bots {
        let color = PLAYER_COLORS[(humans.len() + i) % PLAYER_COLORS.len()];
        state.add_player(Player::new(
            Uuid::new_v4().to_string(),
            format!("Bot {}", i + 1),
            color,
            true,
        ));
    }

    state.assign_territories(rng);
    state.deal_objectives(rng);
    state.shuffle_deck(rng);
    let first = state.start(rng)?;
    Ok((state, first))
}

/// Spawns a started match. A bot holding the opening turn plays after
/// `settle_delay` so clients have time to connect.
pub fn launch_match(room_id: &str, humans: &[RosterEntry], config: &GameConfig) -> WarResult<GameHandle> {
    let mut rng = match_rng(config);
    let (state, first) = setup_match(room_id, humans, config, &mut rng)?;
    log::info!(
        "🎮 Match {} started with {} players, {} opens",
        room_id,
        state.players.len(),
        first.player_id
    );

    let bot_rng = XorShiftRng::seed_from_u64(rng.gen());
    let (handle, _task) = GameActor::spawn(state, config.clone(), rng);
    if first.is_bot {
        bot::spawn_turn(
            handle.clone(),
            first.player_id,
            config.clone(),
            bot_rng,
            config.settle_delay,
        );
    }
    Ok(handle)
}

/// Live matches by room id
pub struct GameRegistry {
    games: Mutex<HashMap<RoomId, GameHandle>>,
    roster: Arc<dyn RosterProvider>,
    config: GameConfig,
}

impl GameRegistry {
    pub fn new(roster: Arc<dyn RosterProvider>, config: GameConfig) -> Self {
        GameRegistry {
            games: Mutex::new(HashMap::new()),
            roster,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Live match for the room, creating one when there is none or the
    /// previous one has stopped
    pub async fn get_or_create(&self, room_id: &str) -> WarResult<GameHandle> {
        let mut games = self.games.lock().await;
        if let Some(handle) = games.get(room_id) {
            if !handle.is_closed() {
                return Ok(handle.clone());
            }
            log::info!("Replacing stopped match for room {}", room_id);
        }

        let humans = self.roster.roster(room_id).await;
        let handle = if humans.is_empty() {
            // Nobody seated: an empty table that never starts
            log::warn!("Room {} has no roster, opening an empty match", room_id);
            let state = GameState::new(room_id);
            let (handle, _task) = GameActor::spawn(state, self.config.clone(), match_rng(&self.config));
            handle
        } else {
            launch_match(room_id, &humans, &self.config)?
        };

        games.insert(room_id.to_string(), handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, room_id: &str) -> WarResult<GameHandle> {
        let games = self.games.lock().await;
        games
            .get(room_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
            .ok_or_else(|| {
                RegistryError::GameNotFound {
                    room_id: room_id.to_string(),
                }
                .into()
            })
    }

    /// Forgets the room and stops its actor
    pub async fn remove(&self, room_id: &str) -> bool {
        let removed = self.games.lock().await.remove(room_id);
        match removed {
            Some(handle) => {
                if handle.shutdown().await.is_err() {
                    log::debug!("Match {} had already stopped", room_id);
                }
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.games.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WarError;
    use std::time::Duration;

    fn entry(id: &str, name: &str) -> RosterEntry {
        RosterEntry {
            player_id: id.to_string(),
            name: name.to_string(),
        }
    }

    async fn registry_with_config(room_id: &str, humans: &[RosterEntry], config: GameConfig) -> GameRegistry {
        let roster = Arc::new(InMemoryRoster::new());
        for human in humans {
            roster.join(room_id, human.clone()).await;
        }
        GameRegistry::new(roster, config)
    }

    async fn registry_with(room_id: &str, humans: &[RosterEntry]) -> GameRegistry {
        let config = GameConfig {
            // Keep a bot opener from playing during the test
            settle_delay: Duration::from_secs(60),
            teardown_when_empty: false,
            ..GameConfig::instant().with_seed(5)
        };
        registry_with_config(room_id, humans, config).await
    }

    /// First seed whose match opens on a bot turn
    fn bot_opening_seed(humans: &[RosterEntry], config: &GameConfig) -> u64 {
        (0..1000)
            .find(|seed| {
                let mut rng = XorShiftRng::seed_from_u64(*seed);
                let (_, first) = setup_match("room", humans, config, &mut rng).unwrap();
                first.is_bot
            })
            .expect("no seed opens with a bot")
    }

    #[test]
    fn test_setup_pads_with_bots() {
        let humans = [entry("h1", "Ana")];
        let mut rng = XorShiftRng::seed_from_u64(1);
        let (state, first) = setup_match("room", &humans, &GameConfig::instant(), &mut rng).unwrap();

        let players: Vec<_> = state.players.values().collect();
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].name, "Ana");
        assert_eq!(players[0].color, "#FF0000");
        assert!(!players[0].is_bot);
        assert_eq!(players[1].name, "Bot 1");
        assert_eq!(players[1].color, "#0066FF");
        assert_eq!(players[2].name, "Bot 2");
        assert_eq!(players[2].color, "#00CC00");
        assert!(players[1].is_bot && players[2].is_bot);

        assert!(state.territories.iter().all(|t| t.owner.is_some()));
        assert!(players.iter().all(|p| p.objective.is_some()));
        assert_eq!(state.current_turn.as_deref(), Some(first.player_id.as_str()));
    }

    #[test]
    fn test_setup_without_bots_for_full_room() {
        let humans: Vec<_> = (0..4).map(|i| entry(&format!("h{i}"), "x")).collect();
        let mut rng = XorShiftRng::seed_from_u64(1);
        let (state, _) = setup_match("room", &humans, &GameConfig::instant(), &mut rng).unwrap();

        assert_eq!(state.players.len(), 4);
        assert!(state.players.values().all(|p| !p.is_bot));
        let order: Vec<_> = state.turn_order().iter().map(String::as_str).collect();
        assert_eq!(order, vec!["h0", "h1", "h2", "h3"]);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let registry = registry_with("room", &[entry("h1", "Ana"), entry("h2", "Beto")]).await;

        let first = registry.get_or_create("room").await.unwrap();
        let second = registry.get_or_create("room").await.unwrap();

        let a = first.snapshot().await.unwrap();
        let b = second.snapshot().await.unwrap();
        assert_eq!(a.turn_order(), b.turn_order());
        assert_eq!(a.territories, b.territories);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_create_opens_one_match() {
        // Unseeded, so two separate matches would almost surely differ
        let config = GameConfig {
            settle_delay: Duration::from_secs(60),
            teardown_when_empty: false,
            ..GameConfig::instant()
        };
        let registry = Arc::new(registry_with_config("room", &[entry("h1", "Ana")], config).await);

        let callers: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.get_or_create("room").await })
            })
            .collect();

        let mut states = Vec::new();
        for caller in callers {
            let handle = caller.await.unwrap().unwrap();
            states.push(handle.snapshot().await.unwrap());
        }

        assert_eq!(registry.len().await, 1);
        for state in &states[1..] {
            assert_eq!(state.turn_order(), states[0].turn_order());
            assert_eq!(state.territories, states[0].territories);
        }
    }

    #[tokio::test]
    async fn test_bot_opener_plays_after_settle_delay() {
        let humans = [entry("h1", "Ana")];
        let base = GameConfig {
            settle_delay: Duration::from_millis(50),
            teardown_when_empty: false,
            ..GameConfig::instant()
        };
        let seed = bot_opening_seed(&humans, &base);
        let registry = registry_with_config("room", &humans, base.with_seed(seed)).await;

        let handle = registry.get_or_create("room").await.unwrap();
        let opening = handle.snapshot().await.unwrap();
        assert!(!opening.is_current_turn("h1"));

        let mut state = opening;
        for _ in 0..500 {
            if state.is_current_turn("h1") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            state = handle.snapshot().await.unwrap();
        }

        assert!(state.is_current_turn("h1"));
        assert!(state.turn_number >= 2);
        assert!(state.player("h1").unwrap().reinforcements >= 3);
    }

    #[tokio::test]
    async fn test_empty_roster_opens_empty_match() {
        let registry = registry_with("room", &[]).await;
        let handle = registry.get_or_create("room").await.unwrap();
        let state = handle.snapshot().await.unwrap();

        assert!(state.players.is_empty());
        assert!(state.current_turn.is_none());
    }

    #[tokio::test]
    async fn test_empty_match_stays_cached_after_seating() {
        let roster = Arc::new(InMemoryRoster::new());
        let config = GameConfig {
            teardown_when_empty: false,
            ..GameConfig::instant()
        };
        let registry = GameRegistry::new(roster.clone(), config);
        registry.get_or_create("room").await.unwrap();

        // Seating someone later does not restart a live empty match
        roster.join("room", entry("h1", "Ana")).await;
        let state = registry.get_or_create("room").await.unwrap().snapshot().await.unwrap();
        assert!(state.players.is_empty());

        // Once it is removed, the next visitor gets a seated match
        registry.remove("room").await;
        let state = registry.get_or_create("room").await.unwrap().snapshot().await.unwrap();
        assert_eq!(state.players.len(), 3);
        assert!(state.player("h1").is_some());
    }

    #[tokio::test]
    async fn test_remove_stops_match() {
        let registry = registry_with("room", &[entry("h1", "Ana")]).await;
        let handle = registry.get_or_create("room").await.unwrap();

        assert!(registry.remove("room").await);
        assert!(!registry.remove("room").await);
        assert!(handle.snapshot().await.is_err());
        assert!(matches!(
            registry.get("room").await,
            Err(WarError::Registry(RegistryError::GameNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_stopped_match_is_replaced() {
        let registry = registry_with("room", &[entry("h1", "Ana")]).await;
        let old = registry.get_or_create("room").await.unwrap();
        old.shutdown().await.unwrap();
        while !old.is_closed() {
            tokio::task::yield_now().await;
        }

        let fresh = registry.get_or_create("room").await.unwrap();
        assert!(!fresh.is_closed());
        assert!(fresh.snapshot().await.is_ok());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_roster_join_is_idempotent() {
        let roster = InMemoryRoster::new();
        roster.join("room", entry("h1", "Ana")).await;
        roster.join("room", entry("h1", "Ana again")).await;
        roster.join("room", entry("h2", "Beto")).await;

        let seats = roster.roster("room").await;
        assert_eq!(seats, vec![entry("h1", "Ana"), entry("h2", "Beto")]);
        assert!(roster.roster("other").await.is_empty());
    }
}

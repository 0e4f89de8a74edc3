use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{WarError, WarResult};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Per-match tuning shared by the registry, the actor and the bots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Matches are padded with bots up to this many players
    pub min_players: usize,
    /// Pause before a bot plays the opening turn
    pub settle_delay: Duration,
    pub bot_think_delay: Duration,
    pub bot_step_delay: Duration,
    /// Capacity of each client's outbound mailbox
    pub client_mailbox: usize,
    /// Capacity of the actor's inbound queue
    pub inbox_capacity: usize,
    /// Stop the actor once the last client leaves
    pub teardown_when_empty: bool,
    /// Fixed rng seed; entropy when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            min_players: 3,
            settle_delay: Duration::from_secs(2),
            bot_think_delay: Duration::from_secs(1),
            bot_step_delay: Duration::from_millis(500),
            client_mailbox: 256,
            inbox_capacity: 64,
            teardown_when_empty: true,
            seed: None,
        }
    }
}

impl GameConfig {
    /// No pacing delays. Used by tests and the simulator.
    pub fn instant() -> Self {
        GameConfig {
            settle_delay: Duration::ZERO,
            bot_think_delay: Duration::ZERO,
            bot_step_delay: Duration::ZERO,
            ..GameConfig::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_env() -> WarResult<Self> {
        let defaults = GameConfig::default();
        let config = GameConfig {
            min_players: parse_var("WAR_MIN_PLAYERS")?.unwrap_or(defaults.min_players),
            settle_delay: parse_millis("WAR_SETTLE_DELAY_MS")?.unwrap_or(defaults.settle_delay),
            bot_think_delay: parse_millis("WAR_BOT_THINK_DELAY_MS")?
                .unwrap_or(defaults.bot_think_delay),
            bot_step_delay: parse_millis("WAR_BOT_STEP_DELAY_MS")?
                .unwrap_or(defaults.bot_step_delay),
            client_mailbox: parse_var("WAR_CLIENT_MAILBOX")?.unwrap_or(defaults.client_mailbox),
            inbox_capacity: parse_var("WAR_INBOX_CAPACITY")?.unwrap_or(defaults.inbox_capacity),
            teardown_when_empty: parse_var("WAR_TEARDOWN_WHEN_EMPTY")?
                .unwrap_or(defaults.teardown_when_empty),
            seed: parse_var("WAR_SEED")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> WarResult<()> {
        if self.client_mailbox == 0 {
            return Err(WarError::Config("client mailbox capacity must be positive".into()));
        }
        if self.inbox_capacity == 0 {
            return Err(WarError::Config("inbox capacity must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> WarResult<Self> {
        Ok(ServerConfig {
            bind_addr: env::var("WAR_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            game: GameConfig::from_env()?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str) -> WarResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> WarResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| WarError::Config(format!("invalid value for {name}: {raw:?}")))
}

fn parse_millis(name: &str) -> WarResult<Option<Duration>> {
    Ok(parse_var::<u64>(name)?.map(Duration::from_millis))
}

//! Heuristic policy for synthetic players.
//!
//! The decision functions are pure reads over a [`GameState`] snapshot. The
//! driver in [`run_turn`] fetches snapshots through the actor queue and sends
//! its choices back as the same JSON actions a human client would send.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_xorshift::XorShiftRng;

use crate::actions::{ClientAction, PlayerId};
use crate::actor::GameHandle;
use crate::board::TerritoryId;
use crate::config::GameConfig;
use crate::errors::ProtocolResult;
use crate::game::{GameState, Territory};

const MAX_ATTACKS_PER_TURN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOption {
    pub from: TerritoryId,
    pub to: TerritoryId,
    /// Armies on `from` at snapshot time
    pub available: u32,
}

/// Random border territory, or any owned one when the bot has no border.
/// `None` when the pool is empty.
pub fn choose_deploy<R: Rng + ?Sized>(state: &GameState, bot: &str, rng: &mut R) -> Option<TerritoryId> {
    if state.player(bot)?.reinforcements == 0 {
        return None;
    }

    let owned: Vec<&Territory> = state.owned_territories(bot).collect();
    let borders: Vec<&Territory> = owned
        .iter()
        .copied()
        .filter(|territory| state.is_border(territory))
        .collect();

    let pool = if borders.is_empty() { &owned } else { &borders };
    pool.choose(rng).map(|territory| territory.id)
}

/// Every (owned territory with spare armies, foreign neighbour) pair, in
/// catalog order
pub fn attack_options(state: &GameState, bot: &str) -> Vec<AttackOption> {
    state
        .owned_territories(bot)
        .filter(|territory| territory.armies > 1)
        .flat_map(|territory| {
            territory
                .adjacent
                .iter()
                .filter_map(move |adjacent| state.territory(*adjacent))
                .filter(move |neighbor| !neighbor.is_owned_by(bot))
                .map(move |neighbor| AttackOption {
                    from: territory.id,
                    to: neighbor.id,
                    available: territory.armies,
                })
        })
        .collect()
}

/// Random option with a random army count in `[1, min(available - 1, 3)]`
pub fn choose_attack<R: Rng + ?Sized>(
    state: &GameState,
    bot: &str,
    rng: &mut R,
) -> Option<(AttackOption, u32)> {
    let options = attack_options(state, bot);
    let option = *options.choose(rng)?;
    let max_armies = (option.available - 1).min(3);
    if max_armies < 1 {
        return None;
    }
    Some((option, rng.gen_range(1..=max_armies)))
}

/// How many attacks to try this turn: 1 to 3, never more than the options
/// available at the start of the attack phase
pub fn attack_budget<R: Rng + ?Sized>(state: &GameState, bot: &str, rng: &mut R) -> usize {
    let options = attack_options(state, bot).len();
    rng.gen_range(1..=MAX_ATTACKS_PER_TURN).min(options)
}

/// First owned territory with spare armies and an owned neighbour sends half
/// of its spares over
pub fn choose_move(state: &GameState, bot: &str) -> Option<(TerritoryId, TerritoryId, u32)> {
    state
        .owned_territories(bot)
        .filter(|territory| territory.armies > 1)
        .find_map(|from| {
            let moving = (from.armies - 1) / 2;
            if moving < 1 {
                return None;
            }
            from.adjacent
                .iter()
                .filter_map(|adjacent| state.territory(*adjacent))
                .find(|to| to.is_owned_by(bot))
                .map(|to| (from.id, to.id, moving))
        })
}

/// Spawns a detached bot turn after `delay`
pub fn spawn_turn(
    handle: GameHandle,
    bot: PlayerId,
    config: GameConfig,
    rng: XorShiftRng,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let room_id = handle.room_id().to_string();
        match run_turn(&handle, &bot, &config, rng).await {
            Ok(true) => log::debug!("🤖 Bot {} finished its turn in room {}", bot, room_id),
            Ok(false) => log::debug!("Bot {} stood down in room {}", bot, room_id),
            Err(e) => log::debug!("Bot {} stopped in room {}: {}", bot, room_id, e),
        }
    })
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Fresh snapshot, or `None` when the turn has moved on without the bot
async fn snapshot_if_turn(handle: &GameHandle, bot: &str) -> ProtocolResult<Option<GameState>> {
    let state = handle.snapshot().await?;
    Ok(state.is_current_turn(bot).then_some(state))
}

/// Plays one full turn. Returns `Ok(false)` when the bot gave up because the
/// turn was no longer its own, and an error when the match is gone.
pub async fn run_turn(
    handle: &GameHandle,
    bot: &str,
    config: &GameConfig,
    mut rng: XorShiftRng,
) -> ProtocolResult<bool> {
    pause(config.bot_think_delay).await;

    // Deploy the whole pool, one army per action
    loop {
        let Some(state) = snapshot_if_turn(handle, bot).await? else {
            return Ok(false);
        };
        let Some(territory) = choose_deploy(&state, bot, &mut rng) else {
            break;
        };
        handle
            .submit(&ClientAction::TroopAssign {
                player_id: bot.to_string(),
                territory_id: territory,
            })
            .await?;
    }
    pause(config.bot_step_delay).await;

    let Some(state) = snapshot_if_turn(handle, bot).await? else {
        return Ok(false);
    };
    let attacks = attack_budget(&state, bot, &mut rng);
    for _ in 0..attacks {
        let Some(state) = snapshot_if_turn(handle, bot).await? else {
            return Ok(false);
        };
        let Some((option, armies)) = choose_attack(&state, bot, &mut rng) else {
            break;
        };
        handle
            .submit(&ClientAction::Attack {
                player_id: bot.to_string(),
                from: option.from,
                to: option.to,
                attacking_armies: armies,
            })
            .await?;
        pause(config.bot_step_delay).await;
    }

    let Some(state) = snapshot_if_turn(handle, bot).await? else {
        return Ok(false);
    };
    if let Some((from, to, armies)) = choose_move(&state, bot) {
        handle
            .submit(&ClientAction::TroopMove {
                player_id: bot.to_string(),
                from,
                to,
                moving_armies: armies,
            })
            .await?;
        pause(config.bot_step_delay).await;
    }

    handle
        .submit(&ClientAction::FinishTurn {
            player_id: bot.to_string(),
        })
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::GameActor;
    use crate::errors::ProtocolError;
    use crate::game::Player;
    use rand::SeedableRng;
    use TerritoryId::*;

    fn state_with(owners: &[(TerritoryId, &str, u32)]) -> GameState {
        let mut state = GameState::new("room");
        state.add_player(Player::new("bot", "Bot 1", "#00CC00", true));
        state.add_player(Player::new("human", "Ana", "#FF0000", false));
        for territory in state.territories.iter_mut() {
            territory.owner = Some("human".to_string());
            territory.armies = 1;
        }
        for (id, owner, armies) in owners {
            let territory = state.territories.iter_mut().find(|t| t.id == *id).unwrap();
            territory.owner = Some(owner.to_string());
            territory.armies = *armies;
        }
        state
    }

    fn rng() -> XorShiftRng {
        XorShiftRng::seed_from_u64(77)
    }

    #[test]
    fn test_deploy_prefers_border() {
        // Australia is interior once all of Oceania is owned
        let mut state = state_with(&[
            (Australia, "bot", 1),
            (NewGuinea, "bot", 1),
            (Sumatra, "bot", 1),
            (Borneo, "bot", 1),
        ]);
        state.players.get_mut("bot").unwrap().reinforcements = 3;
        let mut rng = rng();

        for _ in 0..50 {
            let choice = choose_deploy(&state, "bot", &mut rng).unwrap();
            let territory = state.territory(choice).unwrap();
            assert!(territory.is_owned_by("bot"));
            assert!(state.is_border(territory));
        }
    }

    #[test]
    fn test_deploy_falls_back_to_any_owned() {
        let mut state = state_with(&[]);
        for territory in state.territories.iter_mut() {
            territory.owner = Some("bot".to_string());
        }
        state.players.get_mut("bot").unwrap().reinforcements = 1;

        assert!(choose_deploy(&state, "bot", &mut rng()).is_some());
    }

    #[test]
    fn test_deploy_none_without_pool() {
        let state = state_with(&[(Brazil, "bot", 3)]);
        assert_eq!(choose_deploy(&state, "bot", &mut rng()), None);
    }

    #[test]
    fn test_attack_options_need_spare_armies() {
        let state = state_with(&[(Brazil, "bot", 1), (Chile, "bot", 3), (Argentina, "bot", 2)]);
        let options = attack_options(&state, "bot");

        // Chile: Brazil and Argentina are its own, Colombia is foreign
        // Argentina: both neighbours are its own
        assert_eq!(
            options,
            vec![AttackOption {
                from: Chile,
                to: Colombia,
                available: 3,
            }]
        );
    }

    #[test]
    fn test_choose_attack_army_bounds() {
        let state = state_with(&[(Brazil, "bot", 2), (Egypt, "bot", 9)]);
        let mut rng = rng();

        for _ in 0..100 {
            let (option, armies) = choose_attack(&state, "bot", &mut rng).unwrap();
            assert!(armies >= 1);
            assert!(armies <= (option.available - 1).min(3));
            assert!(!state.territory(option.to).unwrap().is_owned_by("bot"));
        }
    }

    #[test]
    fn test_choose_attack_without_options() {
        let state = state_with(&[(Brazil, "bot", 1)]);
        assert_eq!(choose_attack(&state, "bot", &mut rng()), None);
    }

    #[test]
    fn test_choose_move_halves_spares() {
        let state = state_with(&[(Brazil, "bot", 6), (Argentina, "bot", 1)]);
        assert_eq!(choose_move(&state, "bot"), Some((Brazil, Argentina, 2)));
    }

    #[test]
    fn test_choose_move_skips_small_stacks() {
        // Two armies leave nothing worth moving
        let state = state_with(&[(Brazil, "bot", 2), (Argentina, "bot", 1)]);
        assert_eq!(choose_move(&state, "bot"), None);
    }

    #[test]
    fn test_attack_budget_capped_by_options() {
        // Chile -> Colombia is the only attack available
        let state = state_with(&[(Brazil, "bot", 1), (Chile, "bot", 3), (Argentina, "bot", 2)]);
        let mut rng = rng();
        for _ in 0..50 {
            assert_eq!(attack_budget(&state, "bot", &mut rng), 1);
        }

        let state = state_with(&[(Brazil, "bot", 1)]);
        assert_eq!(attack_budget(&state, "bot", &mut rng), 0);

        let state = state_with(&[(Brazil, "bot", 4), (Egypt, "bot", 4)]);
        for _ in 0..50 {
            let budget = attack_budget(&state, "bot", &mut rng);
            assert!((1..=MAX_ATTACKS_PER_TURN).contains(&budget));
        }
    }

    #[tokio::test]
    async fn test_run_turn_stands_down_when_not_its_turn() {
        let mut state = state_with(&[(Brazil, "bot", 3)]);
        state.players.get_mut("bot").unwrap().reinforcements = 5;
        state.current_turn = Some("human".to_string());
        let (handle, _task) = GameActor::spawn(state, GameConfig::instant(), rng());
        let before = handle.snapshot().await.unwrap();

        let result = run_turn(&handle, "bot", &GameConfig::instant(), rng()).await;

        assert_eq!(result, Ok(false));
        let after = handle.snapshot().await.unwrap();
        assert_eq!(after.territories, before.territories);
        assert_eq!(after.player("bot").unwrap().reinforcements, 5);
        assert_eq!(after.current_turn.as_deref(), Some("human"));
    }

    #[tokio::test]
    async fn test_run_turn_stops_when_match_is_gone() {
        let mut state = state_with(&[(Brazil, "bot", 3)]);
        state.current_turn = Some("bot".to_string());
        let (handle, task) = GameActor::spawn(state, GameConfig::instant(), rng());

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let result = run_turn(&handle, "bot", &GameConfig::instant(), rng()).await;
        assert!(matches!(result, Err(ProtocolError::GameClosed { .. })));
    }

    #[tokio::test]
    async fn test_spawned_turn_hands_over() {
        let mut state = state_with(&[(Brazil, "bot", 3), (Argentina, "bot", 1)]);
        state.players.get_mut("bot").unwrap().reinforcements = 3;
        state.current_turn = Some("bot".to_string());
        let (handle, _task) = GameActor::spawn(state, GameConfig::instant(), rng());

        spawn_turn(handle.clone(), "bot".to_string(), GameConfig::instant(), rng(), Duration::ZERO)
            .await
            .unwrap();

        let after = handle.snapshot().await.unwrap();
        assert_eq!(after.current_turn.as_deref(), Some("human"));
        assert_eq!(after.player("bot").unwrap().reinforcements, 0);
    }
}

use std::time::Duration;

use clap::Parser;
use war_server::registry::launch_match;
use war_server::{GameConfig, GameState, WarResult};

#[derive(Parser)]
#[command(name = "simulate", about = "Run bot-only War matches headlessly")]
struct Cli {
    /// Number of matches to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,
    /// Seed of the first match; match i uses seed + i
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Stop each match after this many turns
    #[arg(short, long, default_value_t = 30)]
    turns: u32,
    #[arg(short, long, default_value_t = 3)]
    players: usize,
}

async fn play(index: u32, cli: &Cli) -> WarResult<GameState> {
    let config = GameConfig {
        min_players: cli.players,
        teardown_when_empty: false,
        ..GameConfig::instant().with_seed(cli.seed + u64::from(index))
    };
    let room_id = format!("sim-{index}");
    let handle = launch_match(&room_id, &[], &config)?;

    let mut state = handle.snapshot().await?;
    while state.turn_number < cli.turns {
        tokio::time::sleep(Duration::from_millis(1)).await;
        state = handle.snapshot().await?;
    }
    handle.shutdown().await?;
    Ok(state)
}

fn print_standings(state: &GameState) {
    println!("  Turns played: {}", state.turn_number);
    for player in state.players.values() {
        let armies: u32 = state.owned_territories(&player.id).map(|t| t.armies).sum();
        println!(
            "    {:8} {} -- territories: {:2}, armies: {:3}, cards: {}",
            player.name,
            player.color,
            state.territory_count(&player.id),
            armies,
            player.cards.len()
        );
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    println!("🎮 War Match Simulation");
    println!("=======================");
    println!("  - Matches: {}", cli.games);
    println!("  - Players: {}", cli.players);
    println!("  - Turns per match: {}", cli.turns);

    for index in 0..cli.games {
        println!("\n🎯 Match {} (seed {})", index + 1, cli.seed + u64::from(index));
        match play(index, &cli).await {
            Ok(state) => print_standings(&state),
            Err(e) => eprintln!("  Match error: {}", e),
        }
    }
}

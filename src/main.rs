use std::sync::Arc;

use axum::http::Method;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use war_server::{
    websocket, GameRegistry, GameState, InMemoryRoster, RosterEntry, ServerConfig, VERSION,
};

// Application state
struct AppState {
    registry: GameRegistry,
    roster: Arc<InMemoryRoster>,
    mailbox_capacity: usize,
}

type SharedState = Arc<AppState>;

async fn health() -> String {
    format!("War server {VERSION}")
}

// Seat a player in a room. Stands in for an external room service.
async fn join_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Json(entry): Json<RosterEntry>,
) -> StatusCode {
    log::info!("Seating {} ({}) in room {}", entry.name, entry.player_id, room_id);
    state.roster.join(&room_id, entry).await;
    StatusCode::CREATED
}

// Current state of a live match
async fn get_game(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<GameState>, StatusCode> {
    let handle = state
        .registry
        .get(&room_id)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let snapshot = handle.snapshot().await.map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(snapshot))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((room_id, player_id)): Path<(String, String)>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    let game = match state.registry.get_or_create(&room_id).await {
        Ok(game) => game,
        Err(e) => {
            log::error!("❌ Could not open room {}: {}", room_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let capacity = state.mailbox_capacity;

    ws.on_upgrade(move |socket| websocket::handle_connection(socket, game, player_id, capacity))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    let roster = Arc::new(InMemoryRoster::new());
    let state = Arc::new(AppState {
        registry: GameRegistry::new(roster.clone(), config.game.clone()),
        roster,
        mailbox_capacity: config.game.client_mailbox,
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = Router::new()
        .route("/", get(health))
        .route("/rooms/{room_id}/players", post(join_room))
        .route("/games/{room_id}", get(get_game))
        .route("/ws/games/{room_id}/{player_id}", get(ws_handler))
        .with_state(state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Starting War server on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

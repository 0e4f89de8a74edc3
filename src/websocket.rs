use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};

use crate::actions::PlayerId;
use crate::actor::{ClientHandle, GameHandle};

/// Bridges one socket to a match actor until either side goes away.
///
/// Outbound updates arrive through the client's bounded mailbox; inbound text
/// frames are forwarded untouched to the actor queue, which parses them.
pub async fn handle_connection(socket: WebSocket, game: GameHandle, player_id: PlayerId, mailbox_capacity: usize) {
    let room_id = game.room_id().to_string();
    let (client, mut mailbox) = ClientHandle::new(player_id, mailbox_capacity);
    let client_id = client.id.clone();
    log::info!(
        "🔌 WebSocket connected: {} as {} (room {})",
        client_id,
        client.player_id,
        room_id
    );

    if let Err(e) = game.register(client).await {
        log::error!("❌ Failed to register {}: {}", client_id, e);
        return;
    }

    let (mut sender, mut receiver) = socket.split();

    // Mailbox -> socket. Ends when the actor drops the client or the socket fails.
    let client_id_for_updates = client_id.clone();
    let mut update_task = tokio::spawn(async move {
        while let Some(json) = mailbox.recv().await {
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                log::debug!("Failed to send to connection {}: {}", client_id_for_updates, e);
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Socket -> actor queue
    let game_for_messages = game.clone();
    let client_id_for_messages = client_id.clone();
    let mut message_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    log::debug!("🔍 {} sent: {}", client_id_for_messages, text.as_str());
                    if game_for_messages.submit_raw(text.as_str()).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    log::info!("WebSocket connection {} closed", client_id_for_messages);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut update_task => {
            message_task.abort();
        }
        _ = &mut message_task => {
            update_task.abort();
        }
    }

    if game.unregister(client_id.clone()).await.is_err() {
        log::debug!("Room {} already stopped when {} left", room_id, client_id);
    }
    log::info!("WebSocket connection {} terminated for room {}", client_id, room_id);
}

//! Realtime chat gateway.
//!
//! One WebSocket endpoint authenticates connections at handshake time,
//! then relays room events: inbound frames on a connection are processed
//! to completion, in order, while independent connections interleave
//! freely. Outbound traffic flows through a per-connection channel whose
//! sending half the room registry holds.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::auth::Claims;
use crate::chat::{
    ChatMessageRepository, NewChatMessage, RoomRegistry, RoomRepository, MAX_CONTENT_LENGTH,
};
use crate::db::DbPool;
use crate::web::dto::ChatMessageResponse;
use crate::web::middleware::JwtState;

use super::messages::{ClientEvent, ServerEvent};

/// Query parameters for the WebSocket handshake.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer token presented at connect time.
    pub token: String,
}

/// State for the realtime gateway.
pub struct GatewayState {
    /// Database pool for persistence.
    pub pool: DbPool,
    /// Room membership registry.
    pub registry: Arc<RoomRegistry<ServerEvent>>,
    /// Token verification state, shared with the REST layer.
    pub jwt: Arc<JwtState>,
}

impl GatewayState {
    /// Create a new gateway state.
    pub fn new(pool: DbPool, jwt: Arc<JwtState>) -> Self {
        Self {
            pool,
            registry: Arc::new(RoomRegistry::new()),
            jwt,
        }
    }
}

/// WebSocket gateway handler.
///
/// GET /api/chat/ws?token={jwt}
///
/// The token is verified before the upgrade; a connection with a missing
/// or invalid token is refused with 401 and no socket handler ever runs.
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WsQuery>,
) -> Response {
    let claims = match state.jwt.verify(&query.token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("WebSocket connection rejected: {}", e);
            return Response::builder()
                .status(401)
                .body("Unauthorized".into())
                .unwrap();
        }
    };

    tracing::info!(
        "WebSocket connection from user {} ({})",
        claims.username,
        claims.sub
    );

    ws.on_upgrade(move |socket| handle_socket(socket, state, claims))
}

/// Handle an authenticated WebSocket connection.
///
/// The identity in `claims` is bound for the connection's lifetime;
/// there is no per-event re-authentication.
async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>, claims: Claims) {
    let connection_id = format!("conn-{}-{}", claims.sub, uuid::Uuid::new_v4());

    tracing::debug!(
        "Gateway session started: {} for user {}",
        connection_id,
        claims.username
    );

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Outbound events (broadcasts and scoped errors) funnel through one
    // channel so they reach the socket in a single order.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    loop {
        tokio::select! {
            // Inbound frames: each event is handled to completion before
            // the next frame is read.
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => {
                                handle_client_event(&state, &connection_id, &claims, &tx, event)
                                    .await;
                            }
                            Err(e) => {
                                tracing::debug!("Failed to parse client event: {}", e);
                                let _ = tx.send(ServerEvent::error("Invalid event format"));
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("WebSocket closed by client: {}", connection_id);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        break;
                    }
                }
            }

            // Outbound events queued for this connection
            outbound = rx.recv() => {
                let Some(event) = outbound else { break };
                if let Ok(json) = serde_json::to_string(&event) {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    // Cleanup: membership in every room is dropped; no leave notification
    // is broadcast.
    state.registry.leave_all(&connection_id).await;
    tracing::debug!("Gateway session ended: {}", connection_id);
}

/// Handle a parsed client event.
async fn handle_client_event(
    state: &GatewayState,
    connection_id: &str,
    claims: &Claims,
    tx: &UnboundedSender<ServerEvent>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::JoinRoom { room_id } => {
            match RoomRepository::exists(&state.pool, room_id).await {
                Ok(true) => {
                    state.registry.join(room_id, connection_id, tx.clone()).await;
                }
                Ok(false) => {
                    let _ = tx.send(ServerEvent::error("Room not found"));
                }
                Err(e) => {
                    tracing::error!("Failed to look up room {}: {}", room_id, e);
                    let _ = tx.send(ServerEvent::error("Failed to join room"));
                }
            }
        }

        ClientEvent::LeaveRoom { room_id } => {
            // No-op if not a member
            state.registry.leave(room_id, connection_id).await;
        }

        ClientEvent::SendMessage { room_id, content } => {
            let content = content.trim();
            if content.is_empty() {
                let _ = tx.send(ServerEvent::error("Message content is required"));
                return;
            }
            if content.chars().count() > MAX_CONTENT_LENGTH {
                let _ = tx.send(ServerEvent::error("Message content is too long"));
                return;
            }
            if !state.registry.is_member(room_id, connection_id).await {
                let _ = tx.send(ServerEvent::error("Join the room before sending"));
                return;
            }

            // Persist first; the broadcast carries the stored record and
            // the sender's copy doubles as the acknowledgment.
            let new_message = NewChatMessage::new(room_id, claims.sub, content);
            match ChatMessageRepository::create(&state.pool, &new_message).await {
                Ok(stored) => {
                    let event = ServerEvent::NewMessage {
                        message: ChatMessageResponse::from(stored),
                    };
                    state.registry.broadcast(room_id, event).await;
                }
                Err(e) => {
                    // Scoped to the originator; nothing is broadcast and
                    // no retry is attempted.
                    tracing::error!("Failed to persist chat message: {}", e);
                    let _ = tx.send(ServerEvent::error("Failed to send message"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, Arc<GatewayState>) {
        let db = Database::open_in_memory().await.unwrap();
        let jwt = Arc::new(JwtState::new("test-secret"));
        let state = Arc::new(GatewayState::new(db.pool().clone(), jwt));
        (db, state)
    }

    async fn seed_user_and_room(db: &Database) -> (i64, i64) {
        let user_id = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "hash"))
            .await
            .unwrap()
            .id;
        sqlx::query("INSERT INTO locations (name, owner_id) VALUES ('Docks', ?)")
            .bind(user_id)
            .execute(db.pool())
            .await
            .unwrap();
        let room = sqlx::query("INSERT INTO chat_rooms (location_id, name) VALUES (1, 'Docks')")
            .execute(db.pool())
            .await
            .unwrap();
        (user_id, room.last_insert_rowid())
    }

    fn claims_for(user_id: i64, username: &str) -> Claims {
        Claims {
            sub: user_id,
            username: username.to_string(),
            is_admin: false,
            iat: 0,
            exp: u64::MAX,
            jti: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_join_unknown_room_sends_scoped_error() {
        let (db, state) = setup().await;
        let (user_id, _) = seed_user_and_room(&db).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let claims = claims_for(user_id, "alice");
        handle_client_event(
            &state,
            "conn-1",
            &claims,
            &tx,
            ClientEvent::JoinRoom { room_id: 999 },
        )
        .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerEvent::ChatError { .. }
        ));
        assert!(!state.registry.is_member(999, "conn-1").await);
    }

    #[tokio::test]
    async fn test_join_then_send_broadcasts_to_members() {
        let (db, state) = setup().await;
        let (user_id, room_id) = seed_user_and_room(&db).await;
        let claims = claims_for(user_id, "alice");

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::JoinRoom { room_id },
        )
        .await;
        handle_client_event(
            &state,
            "conn-b",
            &claims,
            &tx_b,
            ClientEvent::JoinRoom { room_id },
        )
        .await;

        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::SendMessage {
                room_id,
                content: "hi".to_string(),
            },
        )
        .await;

        // Both members receive the broadcast, sender included
        for rx in [&mut rx_a, &mut rx_b] {
            match rx.recv().await.unwrap() {
                ServerEvent::NewMessage { message } => {
                    assert_eq!(message.content, "hi");
                    assert_eq!(message.room_id, room_id);
                    assert_eq!(message.author.as_ref().unwrap().username, "alice");
                }
                other => panic!("Expected NewMessage, got {other:?}"),
            }
        }

        // The message was persisted
        assert_eq!(
            ChatMessageRepository::count(db.pool(), room_id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_send_without_joining_is_scoped_error() {
        let (db, state) = setup().await;
        let (user_id, room_id) = seed_user_and_room(&db).await;
        let claims = claims_for(user_id, "alice");
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_event(
            &state,
            "conn-1",
            &claims,
            &tx,
            ClientEvent::SendMessage {
                room_id,
                content: "hi".to_string(),
            },
        )
        .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerEvent::ChatError { .. }
        ));
        assert_eq!(
            ChatMessageRepository::count(db.pool(), room_id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_send_empty_content_is_scoped_error() {
        let (db, state) = setup().await;
        let (user_id, room_id) = seed_user_and_room(&db).await;
        let claims = claims_for(user_id, "alice");
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_client_event(
            &state,
            "conn-1",
            &claims,
            &tx,
            ClientEvent::JoinRoom { room_id },
        )
        .await;
        handle_client_event(
            &state,
            "conn-1",
            &claims,
            &tx,
            ClientEvent::SendMessage {
                room_id,
                content: "   ".to_string(),
            },
        )
        .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerEvent::ChatError { .. }
        ));
    }

    #[tokio::test]
    async fn test_error_not_broadcast_to_room() {
        let (db, state) = setup().await;
        let (user_id, room_id) = seed_user_and_room(&db).await;
        let claims = claims_for(user_id, "alice");

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::JoinRoom { room_id },
        )
        .await;
        handle_client_event(
            &state,
            "conn-b",
            &claims,
            &tx_b,
            ClientEvent::JoinRoom { room_id },
        )
        .await;

        // conn-a triggers a validation error
        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::SendMessage {
                room_id,
                content: String::new(),
            },
        )
        .await;

        assert!(matches!(
            rx_a.recv().await.unwrap(),
            ServerEvent::ChatError { .. }
        ));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_room_stops_broadcasts() {
        let (db, state) = setup().await;
        let (user_id, room_id) = seed_user_and_room(&db).await;
        let claims = claims_for(user_id, "alice");

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::JoinRoom { room_id },
        )
        .await;
        handle_client_event(
            &state,
            "conn-b",
            &claims,
            &tx_b,
            ClientEvent::JoinRoom { room_id },
        )
        .await;
        handle_client_event(
            &state,
            "conn-b",
            &claims,
            &tx_b,
            ClientEvent::LeaveRoom { room_id },
        )
        .await;

        handle_client_event(
            &state,
            "conn-a",
            &claims,
            &tx_a,
            ClientEvent::SendMessage {
                room_id,
                content: "hi".to_string(),
            },
        )
        .await;

        assert!(matches!(
            rx_a.recv().await.unwrap(),
            ServerEvent::NewMessage { .. }
        ));
        assert!(rx_b.try_recv().is_err());
    }
}

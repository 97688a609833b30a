//! WebSocket event types for the realtime gateway.
//!
//! Both directions are closed tagged unions, validated at the boundary
//! before dispatch. Unknown or malformed frames never reach a handler.

use serde::{Deserialize, Serialize};

use crate::web::dto::ChatMessageResponse;

/// Events sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join a room's broadcast group.
    JoinRoom {
        /// Room ID to join.
        room_id: i64,
    },
    /// Leave a room's broadcast group.
    LeaveRoom {
        /// Room ID to leave.
        room_id: i64,
    },
    /// Send a chat message to a room.
    SendMessage {
        /// Target room ID.
        room_id: i64,
        /// Message content.
        content: String,
    },
}

/// Events sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A persisted chat message, broadcast to the room's group.
    NewMessage {
        /// The stored message with its author attached.
        message: ChatMessageResponse,
    },
    /// An error scoped to the originating connection.
    ChatError {
        /// Human-readable message.
        message: String,
    },
}

impl ServerEvent {
    /// Create a scoped error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::ChatError {
            message: message.into(),
        }
    }
}

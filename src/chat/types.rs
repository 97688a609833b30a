//! Chat types for Plaza.

use chrono::{DateTime, Utc};

use crate::datetime::parse_timestamp;
use crate::db::UserSummary;

/// Maximum length for a chat message.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Hard cap on room history responses.
pub const HISTORY_LIMIT: usize = 50;

/// A location that a chat room is bound to.
///
/// Locations are provisioned outside this core and read-only here.
#[derive(Debug, Clone)]
pub struct Location {
    /// Location ID.
    pub id: i64,
    /// Location name.
    pub name: String,
    /// Owning user ID.
    pub owner_id: i64,
}

/// A chat room, bound one-to-one to a location.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    /// Room ID.
    pub id: i64,
    /// Bound location ID (unique).
    pub location_id: i64,
    /// Room name.
    pub name: String,
    /// Room description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Database row type for ChatRoom.
#[derive(sqlx::FromRow)]
pub(crate) struct ChatRoomRow {
    pub id: i64,
    pub location_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<ChatRoomRow> for ChatRoom {
    fn from(row: ChatRoomRow) -> Self {
        Self {
            id: row.id,
            location_id: row.location_id,
            name: row.name,
            description: row.description,
            created_at: parse_timestamp(&row.created_at),
        }
    }
}

/// A room listing entry: the room with its location and owner attached.
#[derive(Debug, Clone)]
pub struct RoomListing {
    /// The room.
    pub room: ChatRoom,
    /// The bound location.
    pub location: Location,
    /// The location owner's summary.
    pub owner: UserSummary,
}

/// A stored chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Message ID.
    pub id: i64,
    /// Room the message belongs to.
    pub room_id: i64,
    /// Author user ID. None once the author has been removed.
    pub author_id: Option<i64>,
    /// Message content.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A chat message with its author summary attached.
///
/// This is the shape the gateway broadcasts and the history endpoint
/// returns. The author is None for messages whose author was removed.
#[derive(Debug, Clone)]
pub struct ChatMessageWithAuthor {
    /// The message.
    pub message: ChatMessage,
    /// The author's summary, if the author still exists.
    pub author: Option<UserSummary>,
}

/// Database row for a chat message left-joined with its author.
#[derive(sqlx::FromRow)]
pub(crate) struct ChatMessageRow {
    pub id: i64,
    pub room_id: i64,
    pub author_id: Option<i64>,
    pub content: String,
    pub created_at: String,
    pub author_username: Option<String>,
}

impl From<ChatMessageRow> for ChatMessageWithAuthor {
    fn from(row: ChatMessageRow) -> Self {
        let author = match (row.author_id, row.author_username) {
            (Some(id), Some(username)) => Some(UserSummary { id, username }),
            _ => None,
        };
        Self {
            message: ChatMessage {
                id: row.id,
                room_id: row.room_id,
                author_id: row.author_id,
                content: row.content,
                created_at: parse_timestamp(&row.created_at),
            },
            author,
        }
    }
}

/// New chat message for insertion.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    /// Room ID.
    pub room_id: i64,
    /// Author user ID.
    pub author_id: i64,
    /// Message content.
    pub content: String,
}

impl NewChatMessage {
    /// Create a new chat message.
    pub fn new(room_id: i64, author_id: i64, content: impl Into<String>) -> Self {
        Self {
            room_id,
            author_id,
            content: content.into(),
        }
    }
}

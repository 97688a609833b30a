//! Room directory and chat log repositories for Plaza.

use sqlx::SqlitePool;

use super::types::{
    ChatMessageRow, ChatMessageWithAuthor, ChatRoom, ChatRoomRow, Location, NewChatMessage,
    RoomListing, HISTORY_LIMIT,
};
use crate::db::UserSummary;
use crate::{PlazaError, Result};

/// Database row for a room joined with its location and owner.
#[derive(sqlx::FromRow)]
struct RoomListingRow {
    id: i64,
    location_id: i64,
    name: String,
    description: Option<String>,
    created_at: String,
    location_name: String,
    owner_id: i64,
    owner_username: String,
}

impl From<RoomListingRow> for RoomListing {
    fn from(row: RoomListingRow) -> Self {
        Self {
            location: Location {
                id: row.location_id,
                name: row.location_name.clone(),
                owner_id: row.owner_id,
            },
            owner: UserSummary {
                id: row.owner_id,
                username: row.owner_username,
            },
            room: ChatRoom::from(ChatRoomRow {
                id: row.id,
                location_id: row.location_id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
            }),
        }
    }
}

/// Repository for the room directory.
///
/// Rooms are created at provisioning time together with their location;
/// this core only reads them.
pub struct RoomRepository;

impl RoomRepository {
    /// List all rooms with their bound location and owner summary.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<RoomListing>> {
        let rows = sqlx::query_as::<_, RoomListingRow>(
            "SELECT r.id, r.location_id, r.name, r.description, r.created_at,
                    l.name AS location_name, u.id AS owner_id, u.username AS owner_username
             FROM chat_rooms r
             JOIN locations l ON l.id = r.location_id
             JOIN users u ON u.id = l.owner_id
             ORDER BY r.id",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(RoomListing::from).collect())
    }

    /// Get a room by ID.
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ChatRoom>> {
        let result = sqlx::query_as::<_, ChatRoomRow>(
            "SELECT id, location_id, name, description, created_at
             FROM chat_rooms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(ChatRoom::from))
    }

    /// Check that a room exists.
    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM chat_rooms WHERE id = ?)")
                .bind(id)
                .fetch_one(pool)
                .await
                .map_err(|e| PlazaError::Database(e.to_string()))?;
        Ok(exists.0)
    }
}

/// Repository for the append-only chat log.
pub struct ChatMessageRepository;

impl ChatMessageRepository {
    /// Persist a chat message and return it with the author attached.
    pub async fn create(
        pool: &SqlitePool,
        message: &NewChatMessage,
    ) -> Result<ChatMessageWithAuthor> {
        let result = sqlx::query(
            "INSERT INTO chat_messages (room_id, author_id, content) VALUES (?, ?, ?)",
        )
        .bind(message.room_id)
        .bind(message.author_id)
        .bind(&message.content)
        .execute(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("chat message".to_string()))
    }

    /// Get a chat message by ID with its author attached.
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ChatMessageWithAuthor>> {
        let result = sqlx::query_as::<_, ChatMessageRow>(
            "SELECT m.id, m.room_id, m.author_id, m.content, m.created_at,
                    u.username AS author_username
             FROM chat_messages m
             LEFT JOIN users u ON u.id = m.author_id
             WHERE m.id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(ChatMessageWithAuthor::from))
    }

    /// Get room history in chronological order (oldest first).
    ///
    /// Returns the most recent messages, hard-capped at [`HISTORY_LIMIT`]
    /// regardless of the requested limit. No further pagination exists.
    pub async fn history(
        pool: &SqlitePool,
        room_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessageWithAuthor>> {
        let limit = limit.min(HISTORY_LIMIT);

        let rows = sqlx::query_as::<_, ChatMessageRow>(
            "SELECT m.id, m.room_id, m.author_id, m.content, m.created_at,
                    u.username AS author_username
             FROM chat_messages m
             LEFT JOIN users u ON u.id = m.author_id
             WHERE m.room_id = ?
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ?",
        )
        .bind(room_id)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        // Reverse to get chronological order
        Ok(rows
            .into_iter()
            .map(ChatMessageWithAuthor::from)
            .rev()
            .collect())
    }

    /// Count messages for a room.
    pub async fn count(pool: &SqlitePool, room_id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE room_id = ?")
                .bind(room_id)
                .fetch_one(pool)
                .await
                .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(count.0)
    }
}

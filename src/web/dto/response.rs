//! Response DTOs for the Plaza web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::chat::{ChatMessageWithAuthor, RoomListing};
use crate::db::UserSummary;
use crate::mail::{Message, MessageStatus, MessageWithParty};

/// Generic API response wrapper: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub token: String,
    /// Authenticated user.
    pub user: UserSummary,
}

/// Current user response (for /api/auth/me).
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// Authenticated user.
    pub user: UserSummary,
    /// Unread mail count.
    pub unread_count: i64,
}

/// Unread mail count response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    /// Number of unread mails.
    pub count: i64,
}

/// A mail message in responses.
///
/// Inbox entries carry the sender, outbox entries the recipient; a
/// detail view carries neither.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Message ID.
    pub id: i64,
    /// Sender user ID.
    pub sender_id: i64,
    /// Recipient user ID.
    pub recipient_id: i64,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Lifecycle status.
    pub status: MessageStatus,
    /// When the message was sent (RFC3339).
    pub sent_at: String,
    /// When the recipient first read the message (RFC3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    /// Sender summary (inbox listings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    /// Recipient summary (outbox listings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<UserSummary>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            subject: m.subject,
            body: m.body,
            status: m.status,
            sent_at: m.sent_at.to_rfc3339(),
            read_at: m.read_at.map(|t| t.to_rfc3339()),
            sender: None,
            recipient: None,
        }
    }
}

impl MessageResponse {
    /// Build an inbox entry: the counterparty is the sender.
    pub fn inbox_entry(entry: MessageWithParty) -> Self {
        let mut response = Self::from(entry.message);
        response.sender = Some(entry.party);
        response
    }

    /// Build an outbox entry: the counterparty is the recipient.
    pub fn outbox_entry(entry: MessageWithParty) -> Self {
        let mut response = Self::from(entry.message);
        response.recipient = Some(entry.party);
        response
    }
}

/// Location summary in room listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    /// Location ID.
    pub id: i64,
    /// Location name.
    pub name: String,
}

/// A chat room in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    /// Room ID.
    pub id: i64,
    /// Room name.
    pub name: String,
    /// Room description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Bound location.
    pub location: LocationResponse,
    /// Location owner.
    pub owner: UserSummary,
}

impl From<RoomListing> for RoomResponse {
    fn from(listing: RoomListing) -> Self {
        Self {
            id: listing.room.id,
            name: listing.room.name,
            description: listing.room.description,
            location: LocationResponse {
                id: listing.location.id,
                name: listing.location.name,
            },
            owner: listing.owner,
        }
    }
}

/// A chat message in responses and gateway broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, Serialize, ToSchema)]
pub struct ChatMessageResponse {
    /// Message ID.
    pub id: i64,
    /// Message content.
    pub content: String,
    /// Room the message belongs to.
    pub room_id: i64,
    /// Creation timestamp (RFC3339).
    pub created_at: String,
    /// Author summary. Null once the author has been removed.
    pub author: Option<UserSummary>,
}

impl From<ChatMessageWithAuthor> for ChatMessageResponse {
    fn from(m: ChatMessageWithAuthor) -> Self {
        Self {
            id: m.message.id,
            content: m.message.content,
            room_id: m.message.room_id,
            created_at: m.message.created_at.to_rfc3339(),
            author: m.author,
        }
    }
}

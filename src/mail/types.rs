//! Mail types for Plaza.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::parse_timestamp;
use crate::db::UserSummary;

/// Maximum length for mail subject.
pub const MAX_SUBJECT_LENGTH: usize = 100;

/// Maximum length for mail body.
pub const MAX_BODY_LENGTH: usize = 10000;

/// Lifecycle status of a mail message.
///
/// The ordering is the lifecycle: a message never moves to a lower
/// status. `Draft` and `Delivered` are representable for storage
/// compatibility but no operation currently produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Composed but not sent.
    Draft,
    /// Sent by the sender.
    Sent,
    /// Delivered to the recipient's client.
    Delivered,
    /// Read by the recipient.
    Read,
}

impl MessageStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Draft => "draft",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }

    /// Parse from the stored string representation.
    pub fn parse(s: &str) -> Self {
        match s {
            "draft" => MessageStatus::Draft,
            "delivered" => MessageStatus::Delivered,
            "read" => MessageStatus::Read,
            _ => MessageStatus::Sent,
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mail message.
#[derive(Debug, Clone)]
pub struct Message {
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
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
    /// When the recipient first read the message.
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Check whether a user may view this message.
    pub fn is_visible_to(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

/// Database row type for Message.
#[derive(sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub sent_at: String,
    pub read_at: Option<String>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            subject: row.subject,
            body: row.body,
            status: MessageStatus::parse(&row.status),
            sent_at: parse_timestamp(&row.sent_at),
            read_at: row.read_at.as_deref().map(parse_timestamp),
        }
    }
}

/// New mail for creation.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Sender user ID.
    pub sender_id: i64,
    /// Recipient user ID.
    pub recipient_id: i64,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl NewMessage {
    /// Create a new mail.
    pub fn new(
        sender_id: i64,
        recipient_id: i64,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender_id,
            recipient_id,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// A message annotated with the counterparty's public summary.
///
/// Inbox entries carry the sender, outbox entries the recipient.
#[derive(Debug, Clone)]
pub struct MessageWithParty {
    /// The message itself.
    pub message: Message,
    /// The counterparty's summary.
    pub party: UserSummary,
}

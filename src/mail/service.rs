//! Mail service for Plaza.
//!
//! This module provides high-level mail operations with business logic
//! including recipient validation, automatic read marking, and access control.

use sqlx::SqlitePool;

use crate::db::UserRepository;
use crate::{PlazaError, Result};

use super::repository::MessageRepository;
use super::types::{
    Message, MessageStatus, MessageWithParty, NewMessage, MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH,
};

/// Request to send a mail.
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    /// Sender user ID.
    pub sender_id: i64,
    /// Recipient user ID.
    pub recipient_id: i64,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl SendMessageRequest {
    /// Create a new send request.
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

/// Service for mail operations.
pub struct MailService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MailService<'a> {
    /// Create a new MailService with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Send a mail.
    ///
    /// Validates the request and creates the mail with status `sent`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Subject or body is empty or too long
    /// - Sender and recipient are the same user
    /// - Recipient does not exist or has been removed
    pub async fn send(&self, request: &SendMessageRequest) -> Result<Message> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(PlazaError::Validation("subject is required".to_string()));
        }
        if subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(PlazaError::Validation(format!(
                "subject must be at most {MAX_SUBJECT_LENGTH} characters"
            )));
        }

        let body = request.body.trim();
        if body.is_empty() {
            return Err(PlazaError::Validation("body is required".to_string()));
        }
        if body.chars().count() > MAX_BODY_LENGTH {
            return Err(PlazaError::Validation(format!(
                "body must be at most {MAX_BODY_LENGTH} characters"
            )));
        }

        if request.recipient_id == request.sender_id {
            return Err(PlazaError::Validation(
                "cannot send a message to yourself".to_string(),
            ));
        }

        let user_repo = UserRepository::new(self.pool);
        let recipient = user_repo
            .get_active_by_id(request.recipient_id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("recipient".to_string()))?;

        let new_message = NewMessage::new(request.sender_id, recipient.id, subject, body);
        MessageRepository::create(self.pool, &new_message).await
    }

    /// List received mails for a user, newest first, sender attached.
    pub async fn inbox(&self, user_id: i64) -> Result<Vec<MessageWithParty>> {
        MessageRepository::list_inbox(self.pool, user_id).await
    }

    /// List sent mails for a user, newest first, recipient attached.
    pub async fn outbox(&self, user_id: i64) -> Result<Vec<MessageWithParty>> {
        MessageRepository::list_outbox(self.pool, user_id).await
    }

    /// Get a mail by ID with access control.
    ///
    /// Only the sender or recipient can view the mail. When the recipient
    /// views an unread mail it is atomically transitioned to `read`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail doesn't exist or the user is neither
    /// sender nor recipient.
    pub async fn open(&self, message_id: i64, user_id: i64) -> Result<Message> {
        let message = MessageRepository::get_by_id(self.pool, message_id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("message".to_string()))?;

        if !message.is_visible_to(user_id) {
            return Err(PlazaError::Permission(
                "not a party to this message".to_string(),
            ));
        }

        // Mark as read if the recipient is viewing
        if message.recipient_id == user_id && message.status != MessageStatus::Read {
            MessageRepository::mark_read(self.pool, message_id).await?;
            return MessageRepository::get_by_id(self.pool, message_id)
                .await?
                .ok_or_else(|| PlazaError::NotFound("message".to_string()));
        }

        Ok(message)
    }

    /// Explicitly mark a mail as read.
    ///
    /// Same authorization as [`open`](Self::open); idempotent if already
    /// read. Only the recipient's call performs the transition.
    pub async fn mark_read(&self, message_id: i64, user_id: i64) -> Result<Message> {
        self.open(message_id, user_id).await
    }

    /// Count unread mails for a user.
    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        MessageRepository::count_unread(self.pool, user_id).await
    }
}

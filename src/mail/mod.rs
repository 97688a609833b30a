//! Mail module for Plaza.
//!
//! This module provides private mail functionality including:
//! - Mail sending with recipient validation
//! - Inbox and outbox listings with counterparty summaries
//! - Read/unread status tracking with an atomic read transition

mod repository;
mod service;
mod types;

pub use repository::MessageRepository;
pub use service::{MailService, SendMessageRequest};
pub use types::{
    Message, MessageStatus, MessageWithParty, NewMessage, MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH,
};

//! Chat module for Plaza.
//!
//! This module provides the room directory (rooms bound one-to-one to
//! locations), the append-only chat log, and the membership registry the
//! realtime gateway broadcasts through.

mod registry;
mod repository;
mod types;

pub use registry::RoomRegistry;
pub use repository::{ChatMessageRepository, RoomRepository};
pub use types::{
    ChatMessage, ChatMessageWithAuthor, ChatRoom, Location, NewChatMessage, RoomListing,
    HISTORY_LIMIT, MAX_CONTENT_LENGTH,
};

//! API handlers for the Plaza web layer.

pub mod auth;
pub mod chat;
pub mod mail;

pub use auth::*;
pub use chat::*;
pub use mail::*;

use std::sync::Arc;

use crate::Database;

/// Shared database handle.
pub type SharedDatabase = Arc<Database>;

/// Application state shared by all handlers.
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Secret used to sign access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub token_expiry_secs: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            db,
            jwt_secret: jwt_secret.to_string(),
            token_expiry_secs,
        }
    }
}

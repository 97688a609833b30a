//! Request DTOs for the Plaza web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::mail::{MAX_BODY_LENGTH, MAX_SUBJECT_LENGTH};

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Request body for sending a mail.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageBody {
    /// Recipient user ID.
    pub recipient_id: i64,
    /// Subject line, at most [`MAX_SUBJECT_LENGTH`] characters.
    #[validate(length(min = 1, max = 100, message = "invalid subject length"))]
    pub subject: String,
    /// Message body, at most [`MAX_BODY_LENGTH`] characters.
    #[validate(length(min = 1, max = 10000, message = "invalid body length"))]
    pub body: String,
}

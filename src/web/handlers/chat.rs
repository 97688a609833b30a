//! Room directory handlers for the Plaza web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::chat::{ChatMessageRepository, RoomRepository, HISTORY_LIMIT};
use crate::web::dto::{ApiResponse, ChatMessageResponse, RoomResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/chat/rooms - List all rooms with location and owner.
#[utoipa::path(
    get,
    path = "/chat/rooms",
    tag = "chat",
    responses(
        (status = 200, description = "All rooms", body = Vec<RoomResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<RoomResponse>>>, ApiError> {
    let listings = RoomRepository::list(state.db.pool())
        .await
        .map_err(ApiError::from)?;

    let responses = listings.into_iter().map(RoomResponse::from).collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/chat/rooms/:room_id/messages - Room history.
///
/// Ascending by creation time, capped at 50 entries.
#[utoipa::path(
    get,
    path = "/chat/rooms/{room_id}/messages",
    tag = "chat",
    params(
        ("room_id" = i64, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room history, oldest first", body = Vec<ChatMessageResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn room_history(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(room_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ChatMessageResponse>>>, ApiError> {
    let messages = ChatMessageRepository::history(state.db.pool(), room_id, HISTORY_LIMIT)
        .await
        .map_err(ApiError::from)?;

    let responses = messages.into_iter().map(ChatMessageResponse::from).collect();

    Ok(Json(ApiResponse::new(responses)))
}

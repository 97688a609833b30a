//! Mail handlers for the Plaza web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use utoipa;
use validator::Validate;

use crate::mail::{MailService, SendMessageRequest};
use crate::web::dto::{ApiResponse, MessageResponse, SendMessageBody, UnreadCountResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/messages - Send a mail.
#[utoipa::path(
    post,
    path = "/messages",
    tag = "mail",
    request_body = SendMessageBody,
    responses(
        (status = 201, description = "Mail sent", body = MessageResponse),
        (status = 400, description = "Invalid input or self-send"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let service = MailService::new(state.db.pool());
    let request = SendMessageRequest::new(claims.sub, req.recipient_id, req.subject, req.body);

    let message = service.send(&request).await.map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(MessageResponse::from(message))),
    ))
}

/// GET /api/messages/inbox - List received mails.
#[utoipa::path(
    get,
    path = "/messages/inbox",
    tag = "mail",
    responses(
        (status = 200, description = "Received mails, newest first", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_inbox(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<MessageResponse>>>, ApiError> {
    let entries = MailService::new(state.db.pool())
        .inbox(claims.sub)
        .await
        .map_err(ApiError::from)?;

    let responses = entries
        .into_iter()
        .map(MessageResponse::inbox_entry)
        .collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/messages/outbox - List sent mails.
#[utoipa::path(
    get,
    path = "/messages/outbox",
    tag = "mail",
    responses(
        (status = 200, description = "Sent mails, newest first", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_outbox(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<Vec<MessageResponse>>>, ApiError> {
    let entries = MailService::new(state.db.pool())
        .outbox(claims.sub)
        .await
        .map_err(ApiError::from)?;

    let responses = entries
        .into_iter()
        .map(MessageResponse::outbox_entry)
        .collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/messages/unread-count - Get unread mail count.
#[utoipa::path(
    get,
    path = "/messages/unread-count",
    tag = "mail",
    responses(
        (status = 200, description = "Unread mail count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let count = MailService::new(state.db.pool())
        .unread_count(claims.sub)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(UnreadCountResponse { count })))
}

/// GET /api/messages/:id - Get mail details.
///
/// Viewing as the recipient marks the mail as read.
#[utoipa::path(
    get,
    path = "/messages/{id}",
    tag = "mail",
    params(
        ("id" = i64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Mail details", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Mail not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(message_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let message = MailService::new(state.db.pool())
        .open(message_id, claims.sub)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(MessageResponse::from(message))))
}

/// PUT /api/messages/:id/read - Mark a mail as read.
#[utoipa::path(
    put,
    path = "/messages/{id}/read",
    tag = "mail",
    params(
        ("id" = i64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Mail marked as read", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Mail not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(message_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let message = MailService::new(state.db.pool())
        .mark_read(message_id, claims.sub)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(MessageResponse::from(message))))
}

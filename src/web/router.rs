//! Router configuration for the Plaza web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    get_message, list_inbox, list_outbox, list_rooms, login, mark_read, me, room_history,
    send_message, unread_count, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};
use super::ws::{chat_ws_handler, GatewayState};

/// OpenAPI document for the Plaza API.
#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::auth::login,
        super::handlers::auth::me,
        super::handlers::mail::send_message,
        super::handlers::mail::list_inbox,
        super::handlers::mail::list_outbox,
        super::handlers::mail::unread_count,
        super::handlers::mail::get_message,
        super::handlers::mail::mark_read,
        super::handlers::chat::list_rooms,
        super::handlers::chat::room_history,
    ),
    components(schemas(
        crate::web::dto::LoginRequest,
        crate::web::dto::SendMessageBody,
        crate::web::dto::LoginResponse,
        crate::web::dto::MeResponse,
        crate::web::dto::UnreadCountResponse,
        crate::web::dto::MessageResponse,
        crate::web::dto::RoomResponse,
        crate::web::dto::LocationResponse,
        crate::web::dto::ChatMessageResponse,
        crate::db::UserSummary,
        crate::mail::MessageStatus,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "mail", description = "Private mail"),
        (name = "chat", description = "Room directory")
    )
)]
struct ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    gateway_state: Arc<GatewayState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/me", get(me));

    let mail_routes = Router::new()
        .route("/", post(send_message))
        .route("/inbox", get(list_inbox))
        .route("/outbox", get(list_outbox))
        .route("/unread-count", get(unread_count))
        .route("/:id", get(get_message))
        .route("/:id/read", put(mark_read));

    let chat_routes = Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/:room_id/messages", get(room_history));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/messages", mail_routes)
        .nest("/chat", chat_routes)
        .with_state(app_state);

    // The gateway authenticates during its own handshake and carries its
    // own state.
    let ws_routes = Router::new()
        .route("/api/chat/ws", get(chat_ws_handler))
        .with_state(gateway_state);

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

//! Shared helpers for Plaza integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use plaza::auth::hash_password;
use plaza::config::WebConfig;
use plaza::db::{NewUser, UserRepository};
use plaza::web::handlers::AppState;
use plaza::web::middleware::JwtState;
use plaza::web::router::{create_health_router, create_router};
use plaza::web::ws::GatewayState;
use plaza::Database;

/// Signing secret shared by every test server.
pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test web configuration.
pub fn test_web_config() -> WebConfig {
    WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        jwt_secret: JWT_SECRET.to_string(),
        token_expiry_secs: 900,
    }
}

/// Build the full application router against the given database.
pub fn build_router(config: &WebConfig, db: Arc<Database>) -> axum::Router {
    let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));
    let app_state = Arc::new(AppState::new(
        db.clone(),
        &config.jwt_secret,
        config.token_expiry_secs,
    ));
    let gateway_state = Arc::new(GatewayState::new(db.pool().clone(), jwt_state.clone()));

    create_router(app_state, gateway_state, jwt_state, &config.cors_origins)
        .merge(create_health_router())
}

/// Create an in-process test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Arc<Database>) {
    let config = test_web_config();
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let router = build_router(&config, db.clone());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Bind the application to an ephemeral port for real-socket tests.
///
/// Returns the listening address; the server task runs until the test
/// process exits.
pub async fn spawn_server(db: Arc<Database>) -> SocketAddr {
    let config = test_web_config();
    let router = build_router(&config, db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server crashed");
    });

    addr
}

/// Create a user directly in the database, password properly hashed.
///
/// Registration is outside the messaging core, so tests provision users
/// the way the hosting application would.
pub async fn create_user(db: &Database, username: &str, password: &str) -> i64 {
    let hash = hash_password(password).expect("Failed to hash password");
    UserRepository::new(db.pool())
        .create(&NewUser::new(username, hash))
        .await
        .expect("Failed to create test user")
        .id
}

/// Provision a location and its bound chat room, returning the room id.
pub async fn create_room(db: &Database, owner_id: i64, name: &str) -> i64 {
    let location = sqlx::query("INSERT INTO locations (name, owner_id) VALUES (?, ?)")
        .bind(format!("{name} site"))
        .bind(owner_id)
        .execute(db.pool())
        .await
        .expect("Failed to create test location");

    let room = sqlx::query("INSERT INTO chat_rooms (location_id, name, description) VALUES (?, ?, ?)")
        .bind(location.last_insert_rowid())
        .bind(name)
        .bind(format!("Chat for {name}"))
        .execute(db.pool())
        .await
        .expect("Failed to create test room");

    room.last_insert_rowid()
}

/// Log in through the API and return the issued token.
pub async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    body["data"]["token"]
        .as_str()
        .expect("Login response carries no token")
        .to_string()
}

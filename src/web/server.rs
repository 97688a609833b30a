//! Web server for Plaza.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::WebConfig;

use super::handlers::{AppState, SharedDatabase};
use super::middleware::JwtState;
use super::router::{create_health_router, create_router};
use super::ws::GatewayState;

/// Web server hosting the REST API and the realtime gateway.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    gateway_state: Arc<GatewayState>,
    jwt_state: Arc<JwtState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &WebConfig, db: SharedDatabase) -> Self {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .expect("Invalid web server address");

        let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));
        let app_state = Arc::new(AppState::new(
            db.clone(),
            &config.jwt_secret,
            config.token_expiry_secs,
        ));
        let gateway_state = Arc::new(GatewayState::new(db.pool().clone(), jwt_state.clone()));

        Self {
            addr,
            app_state,
            gateway_state,
            jwt_state,
            cors_origins: config.cors_origins.clone(),
        }
    }

    /// The gateway state, for host applications that need registry access.
    pub fn gateway_state(&self) -> Arc<GatewayState> {
        self.gateway_state.clone()
    }

    /// Run the server until the process is stopped.
    pub async fn run(self) -> crate::Result<()> {
        let router = create_router(
            self.app_state,
            self.gateway_state,
            self.jwt_state,
            &self.cors_origins,
        )
        .merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on {}", self.addr);

        axum::serve(listener, router)
            .await
            .map_err(crate::PlazaError::Io)?;

        Ok(())
    }
}

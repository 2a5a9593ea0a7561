//! HTTP server for remote component execution

use super::handler::{execute_handler, status_handler};
use crate::config::{ConfigResult, ServerConfig};
use crate::ops::Dispatcher;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the executor routes over a shared dispatcher
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/components/:id/execute", post(execute_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(dispatcher)
}

/// HTTP server serving the executor API
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    pub fn address(&self) -> ConfigResult<std::net::SocketAddr> {
        self.config.socket_addr()
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(Arc::clone(&self.dispatcher));
        let addr = self.address()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("Executor API listening on http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

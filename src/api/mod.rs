//! HTTP API server for the chat relay

pub mod chat;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{Config, MAX_MESSAGE_CHARS};
use crate::responder::Responder;
use crate::Result;

/// Shared state for API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub responder: Responder,
    pub max_message_chars: usize,
}

impl ApiState {
    /// State with the default message limit
    #[must_use]
    pub const fn new(responder: Responder) -> Self {
        Self {
            responder,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    responder: Responder,
    port: u16,
    static_dir: Option<PathBuf>,
    max_message_chars: usize,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(responder: Responder, port: u16) -> Self {
        Self {
            responder,
            port,
            static_dir: None,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }

    /// Builder preloaded from relay configuration
    #[must_use]
    pub fn from_config(config: &Config, responder: Responder) -> Self {
        Self::new(responder, config.server.port)
            .static_dir(config.server.static_dir.clone())
            .max_message_chars(config.server.max_message_chars)
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Set the longest accepted message, in characters
    #[must_use]
    pub const fn max_message_chars(mut self, limit: usize) -> Self {
        self.max_message_chars = limit;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            responder: self.responder,
            max_message_chars: self.max_message_chars,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = router(Arc::clone(&self.state));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        router
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        tracing::info!(
            %local,
            upstream = self.state.responder.upstream_name().unwrap_or("canned"),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// API routes without static file serving
pub fn router(state: Arc<ApiState>) -> Router {
    // CORS layer for cross-origin requests from frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::router(Arc::clone(&state)))
        .merge(health::router())
        .merge(health::ready_router(state))
        .layer(CatchPanicLayer::custom(server_error))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Panics inside a handler surface as a generic 500
fn server_error(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("chat handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"error":"Server error"}"#,
    )
        .into_response()
}

//! HTTP server lifecycle
//!
//! Builds the axum router over the shared database and runs it in the
//! background with oneshot-driven graceful shutdown.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::config::ServerConfig;
use super::handlers::{self, AppState};
use crate::storage::{Database, StorageError};

/// Server start-up errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("failed to bind to {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Build the full route table
///
/// Everything except the health check sits behind the bearer token gate.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::show_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/project/update-orders", put(handlers::update_orders))
        .route("/project/statistics", get(handlers::statistics))
        .route("/project/myFavorites", get(handlers::my_favorites))
        .route("/project/quickAccess", get(handlers::quick_access))
        .route("/project/{id}/changeFavorite", put(handlers::change_favorite))
        .route(
            "/project/{id}/changeQuickAccess",
            put(handlers::change_quick_access),
        )
        .route(
            "/project/{id}/removeQuickAccess",
            put(handlers::remove_quick_access),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::bearer_auth,
        ));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server control handle
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    addr: SocketAddr,
}

impl ServerHandle {
    /// Bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound port (resolved when configured as 0)
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL clients should use
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal shutdown and wait for in-flight requests to drain
    pub async fn shutdown_and_wait(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "server task ended abnormally");
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Project tracker HTTP server
pub struct ProjectServer {
    config: ServerConfig,
    db: Arc<Mutex<Database>>,
}

impl ProjectServer {
    /// Create a server over an existing database
    pub fn new(config: ServerConfig, db: Arc<Mutex<Database>>) -> Self {
        Self { config, db }
    }

    /// Open (or create) the configured database and wrap it
    pub fn open(config: ServerConfig, config_dir: &Path) -> Result<Self, ServerError> {
        let db_path = config.resolve_database_path(config_dir);
        tracing::info!(path = %db_path.display(), "opening database");
        let db = Database::new(&db_path)?;
        Ok(Self::new(config, Arc::new(Mutex::new(db))))
    }

    /// Shared database handle
    pub fn database(&self) -> Arc<Mutex<Database>> {
        self.db.clone()
    }

    /// Router with this server's state
    pub fn router(&self) -> Router {
        build_router(Arc::new(AppState {
            db: self.db.clone(),
            api_token: self.config.api_token.clone(),
            default_page_size: self.config.default_page_size,
        }))
    }

    /// Bind and serve in the background
    pub async fn start(&self) -> Result<ServerHandle, ServerError> {
        let host = self.config.host.clone();
        let port = self.config.port;

        ServerConfig::validate_port(port).map_err(ServerError::InvalidPort)?;

        let listener = tokio::net::TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|source| ServerError::Bind {
                host: host.clone(),
                port,
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| ServerError::Bind {
            host: host.clone(),
            port,
            source,
        })?;

        let app = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = graceful.await {
                tracing::error!(error = %e, "server error");
            }
        });

        tracing::info!(%addr, auth = self.config.api_token.is_some(), "server listening");

        Ok(ServerHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            addr,
        })
    }
}

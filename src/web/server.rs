//! HTTP server

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordHasher, SessionManager, SessionStore};
use crate::config::{Config, StoreBackend};
use crate::error::Result;
use crate::store::{MemoryStore, PgStore, UserStore};
use crate::ui::Pages;

use super::routes;

/// Application context handed to every handler
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub hasher: PasswordHasher,
    pub pages: Pages,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Assemble the context from already-opened stores
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let sessions = SessionManager::new(sessions, &config.session);
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost);
        let pages = Pages::load()?;

        Ok(Self {
            config,
            users,
            sessions,
            hasher,
            pages,
        })
    }

    /// Open the configured backend and assemble the context
    pub async fn connect(config: Config) -> Result<Self> {
        match config.database.backend {
            StoreBackend::Postgres => {
                let store = PgStore::connect(&config.database).await?;
                store.migrate().await?;
                let store = Arc::new(store);
                Self::new(config, store.clone(), store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; accounts are lost on restart");
                let store = Arc::new(MemoryStore::new());
                Self::new(config, store.clone(), store)
            }
        }
    }
}

/// Run the HTTP server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    config.validate()?;
    let state = Arc::new(AppState::connect(config).await?);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve an already-bound listener until the process stops
pub async fn serve(listener: tokio::net::TcpListener, state: SharedState) -> Result<()> {
    let purge_every = std::time::Duration::from_secs(state.config.session.purge_interval_secs.max(1));
    let reaper = state.sessions.spawn_reaper(purge_every);

    let app = create_router(state);
    let served = axum::serve(listener, app).await;

    reaper.abort();
    served?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let public_dir = state.config.server.public_dir.clone();

    Router::new()
        .route("/", get(routes::home))
        .route("/signup", get(routes::signup_page).post(routes::signup))
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/logout", get(routes::logout))
        .route("/members", get(routes::members))
        // Admin routes
        .route("/admin", get(routes::admin))
        .route("/promote/{id}", get(routes::promote))
        .route("/demote/{id}", get(routes::demote))
        .nest_service("/public", ServeDir::new(public_dir))
        .fallback(routes::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

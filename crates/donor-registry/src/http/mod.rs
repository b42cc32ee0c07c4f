//! HTTP surface of the donor registry.
//!
//! Routes:
//!
//! | Method | Path                         | Purpose                         |
//! |--------|------------------------------|---------------------------------|
//! | GET    | `/api/status`                | version, donor count, liveness  |
//! | GET    | `/api/donors/search`         | search by blood group / name    |
//! | POST   | `/api/donors`                | register a donor                |
//! | POST   | `/api/donors/register`       | register a donor                |
//! | POST   | `/api/donors/update_status`  | change a donor's availability   |
//! | GET    | `/`, `/admin`                | public search and admin pages   |

mod error;
mod handlers;
mod payload;

pub use error::ApiError;
pub use payload::RegistrationPayload;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Shared state handed to every handler.
///
/// The registry sits behind a single mutex, so each search, registration,
/// or status update (including its save) runs alone. Mutations write the
/// data file and run on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: Arc<Mutex<Registry>>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Wrap a registry for sharing across requests.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            started_at: Utc::now(),
        }
    }

    /// Handle to the shared registry.
    #[must_use]
    pub fn registry(&self) -> Arc<Mutex<Registry>> {
        Arc::clone(&self.registry)
    }

    /// When this state was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Lock the registry for a quick in-memory read.
    pub fn read(&self) -> MutexGuard<'_, Registry> {
        lock(&self.registry)
    }

    /// Run a mutation, and the save it performs, off the async workers.
    ///
    /// # Errors
    ///
    /// Returns the mutation's own error, or [`Error::Server`] if the blocking
    /// task panicked.
    pub async fn write<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let registry = self.registry();
        tokio::task::spawn_blocking(move || op(&mut lock(&registry)))
            .await
            .map_err(|e| Error::server(format!("registry task failed: {e}")))?
    }
}

/// A panic while holding the lock leaves the collection as the last
/// completed step left it, so a poisoned lock is still usable.
fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build the application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let pages = &server.static_dir;

    let app = Router::new()
        .route("/api/status", get(handlers::status))
        .route("/api/donors/search", get(handlers::search))
        .route("/api/donors", post(handlers::register))
        .route("/api/donors/register", post(handlers::register))
        .route("/api/donors/update_status", post(handlers::update_status))
        .route_service("/", ServeFile::new(pages.join("index.html")))
        .route_service("/admin", ServeFile::new(pages.join("admin.html")))
        .fallback_service(ServeDir::new(pages))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Load the registry and serve it until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listen address is invalid, the port cannot be
/// bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let registry = Registry::open(config.data_file());
    info!(
        "Serving {} donors from {}",
        registry.donor_count(),
        registry.store().path().display()
    );

    let app = router(AppState::new(registry), &config.server);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("failed to bind {addr}: {e}")))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(e.to_string()))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C ({e}); running until killed");
            std::future::pending::<()>().await;
        }
    }
}

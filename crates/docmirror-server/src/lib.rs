//! Development HTTP server for docmirror.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - The mirrored document as raw text at its route (default `/README.md`)
//! - A client configuration endpoint
//! - Static files from the public directory
//! - WebSocket endpoint for live reload during development
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docmirror_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source: PathBuf::from("/project/README.md"),
//!         public_dir: PathBuf::from("/project/public"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (docmirror-server)
//!                        │
//!                        ├─► GET /README.md ──► mirrored file (read per request)
//!                        │
//!                        ├─► WebSocket (LiveReloadManager) ◄── ChangeNotifier
//!                        │                                          │
//!                        │                 WatchSession (docmirror-sync) ◄── notify
//!                        │
//!                        └─► Static files (public dir, built-in page)
//! ```
//!
//! The watch session runs whether or not live reload is enabled, so the
//! mirrored document always follows the source.
//!
//! The source document is mirrored before the listener is bound; if that copy
//! fails the server never starts.

mod app;
mod assets;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use docmirror_sync::{
    ChangeNotifier, ClientNotification, MirrorPaths, NotificationSink, WatchSession, mirror,
};
use docmirror_watch::{FsWatcher, Watcher};
use tokio::sync::broadcast;

pub use error::StartupError;
use live_reload::{DisabledSink, LiveReloadManager};
use state::AppState;

/// Capacity of the client notification channel.
const NOTIFICATION_CAPACITY: usize = 16;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Source document (absolute).
    pub source: PathBuf,
    /// Public directory (absolute).
    pub public_dir: PathBuf,
    /// Mirrored document location relative to the public directory.
    pub target: PathBuf,
    /// URL path the mirrored document is served under.
    pub route: String,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Event name sent to clients when the mirrored document changes.
    pub event: String,
    /// Watch debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Enable verbose output.
    pub verbose: bool,
    /// Application version (for `ETag` computation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            source: PathBuf::from("README.md"),
            public_dir: PathBuf::from("public"),
            target: PathBuf::from("README.md"),
            route: "/README.md".to_owned(),
            live_reload_enabled: false,
            event: "readme-update".to_owned(),
            debounce_ms: 100,
            verbose: false,
            version: String::new(),
        }
    }
}

impl ServerConfig {
    /// Absolute path of the mirrored document.
    #[must_use]
    pub fn mirrored_path(&self) -> PathBuf {
        self.public_dir.join(&self.target)
    }
}

/// Prepared application: router plus handles for observing it.
///
/// The source document is watched for as long as the `App` is alive.
pub struct App {
    router: Router,
    state: Arc<AppState>,
    _session: WatchSession,
}

impl App {
    /// The axum router (cheap to clone).
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Subscribe to client notifications, if live reload is enabled.
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<ClientNotification>> {
        self.state.live_reload.as_ref().map(LiveReloadManager::subscribe)
    }
}

/// Mirror the document and build the application.
///
/// Runs the startup mirror to completion, then starts watching through
/// `watcher`. Source changes are always re-mirrored; live reload only
/// decides whether connected clients are notified.
///
/// # Errors
///
/// Returns [`StartupError::InvalidRoute`] if the document route cannot be
/// registered, [`StartupError::Mirror`] if the startup copy fails and
/// [`StartupError::Watch`] if the watcher cannot be started.
pub fn create_app(config: &ServerConfig, watcher: &dyn Watcher) -> Result<App, StartupError> {
    app::check_document_route(&config.route).map_err(|reason| StartupError::InvalidRoute {
        route: config.route.clone(),
        reason,
    })?;

    let paths = Arc::new(MirrorPaths::new(
        config.source.clone(),
        config.mirrored_path(),
    ));

    let bytes = mirror(&paths)?;
    tracing::info!(
        source = %paths.source().display(),
        destination = %paths.destination().display(),
        bytes,
        "Mirrored document"
    );

    let live_reload = config.live_reload_enabled.then(|| {
        let (tx, _rx) = broadcast::channel::<ClientNotification>(NOTIFICATION_CAPACITY);
        LiveReloadManager::new(tx)
    });
    let sink: Arc<dyn NotificationSink> = match &live_reload {
        Some(manager) => manager.sink(),
        None => Arc::new(DisabledSink),
    };

    let notifier = Arc::new(ChangeNotifier::new(Arc::clone(&paths), &config.event, sink));
    let session = WatchSession::start(watcher, notifier)?;
    tracing::info!(
        live_reload = config.live_reload_enabled,
        event = %config.event,
        "Watching source document"
    );

    let state = Arc::new(AppState {
        document_path: paths.destination().to_path_buf(),
        document_route: config.route.clone(),
        public_dir: config.public_dir.clone(),
        event: config.event.clone(),
        live_reload,
        verbose: config.verbose,
        version: config.version.clone(),
    });

    let router = app::create_router(Arc::clone(&state));

    Ok(App {
        router,
        state,
        _session: session,
    })
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the startup mirror fails or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    // Validate the address before touching the filesystem
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))
        .map_err(|_| StartupError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;

    let watcher = FsWatcher::new().with_debounce_ms(config.debounce_ms);
    let app = create_app(&config, &watcher)?;

    tracing::info!(address = %addr, route = %config.route, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from docmirror config.
///
/// # Arguments
///
/// * `config` - docmirror configuration
/// * `version` - Application version
/// * `verbose` - Enable verbose output
#[must_use]
pub fn server_config_from_config(
    config: &docmirror_config::Config,
    version: String,
    verbose: bool,
) -> ServerConfig {
    let document = &config.document_resolved;

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source: document.source.clone(),
        public_dir: document.public_dir.clone(),
        target: document.target.clone(),
        route: document.route(),
        live_reload_enabled: config.live_reload.enabled,
        event: config.live_reload.event.clone(),
        debounce_ms: config.live_reload.debounce_ms,
        verbose,
        version,
    }
}

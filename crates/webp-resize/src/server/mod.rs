//! HTTP service.
//!
//! Routes:
//! - `GET /health`
//! - `GET|POST /process/url?url=...&<options>`
//! - `POST /process/upload?<options>` (multipart)
//! - `/test/*` from `server.test_dir`
//! - everything else from `server.static_dir`, with `index.html` for
//!   unknown paths

mod error;
mod handlers;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use webp_resize_core::config::LimitsConfig;
use webp_resize_core::{Config, HttpFetcher, ImageFetcher, ImageProcessor, ProcessOptions};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared per-service state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    processor: ImageProcessor,
    fetcher: Arc<dyn ImageFetcher>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpFetcher::new(&config.limits));
        Self {
            processor: ImageProcessor::new(config.limits.clone()),
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Options used for parameters a request leaves out.
    fn defaults(&self) -> ProcessOptions {
        self.config.defaults.process_options()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir();
    let frontend =
        ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    let test_pages = ServeDir::new(state.config.test_dir());

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/process/url",
            get(handlers::process_url).post(handlers::process_url),
        )
        .route("/process/upload", post(handlers::process_upload))
        .nest_service("/test", test_pages)
        .fallback_service(frontend)
        .layer(DefaultBodyLimit::max(body_limit(&state.config.limits)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn body_limit(limits: &LimitsConfig) -> usize {
    usize::try_from(limits.max_input_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

/// Bind, serve, and shut down gracefully on Ctrl-C or SIGTERM.
///
/// In-flight requests get `server.shutdown_timeout_secs` to finish once a
/// signal arrives; connections still open after that are dropped.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);

    let static_dir = config.static_dir();
    if !static_dir.join("index.html").is_file() {
        tracing::warn!("No index.html in {:?}; frontend routes will 404", static_dir);
    }

    let app = router(AppState::new(config));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });

    tokio::select! {
        result = server.into_future() => result.context("Server error")?,
        _ = drain_deadline(signalled_rx, grace) => {
            tracing::warn!("Shutdown timed out after {:?}; dropping open connections", grace);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves `grace` after the shutdown signal fires; never if it doesn't.
async fn drain_deadline(signalled: oneshot::Receiver<()>, grace: Duration) {
    if signalled.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

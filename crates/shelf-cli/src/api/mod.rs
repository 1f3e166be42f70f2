//! REST API for the Shelf catalog.
//!
//! Provides HTTP endpoints for:
//! - Book CRUD (`/books`, `/books/:isbn`)
//! - OpenLibrary lookups (`/openlibrary/:isbn`)
//! - Health checks (`/healthz`)
//!
//! All handlers share one `Catalog` behind a process-wide lock, so
//! mutations from concurrent requests are applied one at a time. Another
//! process writing the same file can still overwrite our changes.

pub mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::get,
    Router,
};
use shelf_core::{Catalog, LookupClient};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for API handlers.
pub struct ApiState {
    /// The catalog, owned for the lifetime of the server.
    pub catalog: Arc<RwLock<Catalog>>,

    /// OpenLibrary client.
    pub lookup: LookupClient,
}

impl ApiState {
    pub fn new(catalog: Catalog, lookup: LookupClient) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            lookup,
        }
    }
}

/// Build the API router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    // The bundled HTML front end is served from anywhere, so allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handlers::health))
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/books/:isbn",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/openlibrary/:isbn", get(handlers::lookup_book))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(())
                .on_response(|response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::info!(
                        status = %response.status(),
                        latency_ms = latency.as_millis(),
                        "request finished"
                    );
                }),
        )
        .with_state(state)
}

/// Start the API server.
///
/// Runs until Ctrl-C or SIGTERM, then writes the catalog to disk once more.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    {
        let catalog = state.catalog.read().await;
        info!(
            addr = %listener.local_addr()?,
            books = catalog.len(),
            "Shelf API listening"
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("Server shutting down");
    state
        .catalog
        .read()
        .await
        .flush()
        .context("Failed to save library on shutdown")?;
    info!("Library data saved");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

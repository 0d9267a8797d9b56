//! HTTP server.
//!
//! Every page request goes through [`render_route`] against the shared
//! content source, so a page is at most one revalidation interval behind
//! the store. The studio mount serves its landing page and the schema
//! JSON; configured assets are served from `/assets`.

use crate::config::SiteConfig;
use crate::render::{PageContext, PageStatus, Route, pages, render_route};
use crate::schema;
use crate::source::ContentSource;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// URL prefix the assets directory is served under.
pub const ASSETS_PREFIX: &str = "/assets";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Shared state of the running site.
pub struct AppState<S> {
    pub config: Arc<SiteConfig>,
    pub source: Arc<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            source: Arc::clone(&self.source),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(config: SiteConfig, source: S) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }
}

/// Build the application router.
pub fn router<S: ContentSource>(state: AppState<S>) -> Router {
    let schema_path = format!("{}/schema.json", state.config.studio.base_path);
    let mut app = Router::new().route(&schema_path, get(studio_schema));

    if let Some(dir) = &state.config.site.assets_dir {
        app = app.nest_service(ASSETS_PREFIX, ServeDir::new(dir));
    }

    app.fallback(page::<S>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn page<S: ContentSource>(State(state): State<AppState<S>>, uri: Uri) -> Response {
    let config = state.config.as_ref();
    let route = Route::parse(uri.path(), &config.studio.base_path);
    let ctx = PageContext::new(config, Utc::now());

    match render_route(state.source.as_ref(), &ctx, &route).await {
        Ok(page) => {
            let status = match page.status {
                PageStatus::Ok => StatusCode::OK,
                PageStatus::NotFound => StatusCode::NOT_FOUND,
            };
            (status, Html(page.markup.into_string())).into_response()
        }
        Err(e) => {
            error!(path = uri.path(), error = %e, "Failed to render page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::server_error(&ctx).into_string()),
            )
                .into_response()
        }
    }
}

async fn studio_schema() -> Response {
    match schema::schema_json() {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize schema");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn serve<S: ContentSource>(state: AppState<S>) -> Result<(), ServeError> {
    let address = SocketAddr::new(state.config.server.address, state.config.server.port);
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServeError::Bind { address, source })?;

    info!(address = %address, "Serving site on http://{address}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, finishing in-flight requests");
}

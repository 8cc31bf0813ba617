//! HTTP Server
//!
//! Wires the handlers into an axum [`Router`] and runs it until shutdown.
//!
//! ## Routes
//! - `GET /`: liveness message.
//! - `GET /health`: pool status.
//! - `GET /search/:strategy?q=&limit=`: the four search strategies.
//! - `GET /tables`: browsable entities.
//! - `GET /tables/:entity?limit=`: first rows of one entity.
//!
//! Every route answers cross-origin requests from any origin.

use crate::pool::types::PoolStatus;
use crate::search::engine::SearchDispatcher;
use crate::search::handlers::handle_search;
use crate::store::handlers::{handle_list_tables, handle_preview_table};

use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub pool: PoolStatus,
}

pub fn build_router(dispatcher: Arc<SearchDispatcher>) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/health", get(handle_health))
        .route("/search/:strategy", get(handle_search))
        .route("/tables", get(handle_list_tables))
        .route("/tables/:entity", get(handle_preview_table))
        .layer(Extension(dispatcher))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn handle_home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Medicine search API is running".to_string(),
    })
}

async fn handle_health(
    Extension(dispatcher): Extension<Arc<SearchDispatcher>>,
) -> Json<HealthResponse> {
    let pool = dispatcher.pool().status();
    let status = if pool.closed { "shutting_down" } else { "ok" };
    Json(HealthResponse {
        status: status.to_string(),
        pool,
    })
}

/// Serves requests on `listener` until `shutdown` resolves, then closes the pool.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: Arc<SearchDispatcher>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(dispatcher.clone());

    tracing::info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    dispatcher.pool().shutdown();
    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

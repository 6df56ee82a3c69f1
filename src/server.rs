// ABOUTME: Router assembly and the HTTP listener for the portal
// ABOUTME: Merges the route groups, adds request tracing and shuts down on Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, warn, Level};

use crate::config::environment::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes::{AuthRoutes, ClientRoutes, HealthRoutes, TrainerRoutes};

/// Complete application router with request tracing
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(TrainerRoutes::routes(Arc::clone(&resources)))
        .merge(ClientRoutes::routes(resources))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}

/// Bind `host:http_port` and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the server fails while running.
pub async fn serve(config: &ServerConfig, resources: Arc<ServerResources>) -> AppResult<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .map_err(|e| {
            AppError::config_invalid(format!(
                "Invalid listen address {}:{}: {e}",
                config.host, config.http_port
            ))
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Trainer Portal listening on http://{addr}");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Transport error: {e}")))?;

    info!("Trainer Portal stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
    }
}

// ABOUTME: Liveness endpoint for load balancers and container health checks
// ABOUTME: Answers without touching the hosted store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Service name reported by the liveness endpoint
pub const SERVICE_NAME: &str = "trainer-portal";

/// Overall health status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Serving requests
    Healthy,
}

/// Liveness response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Unix seconds at response time
    pub timestamp: u64,
}

impl HealthResponse {
    /// Liveness snapshot
    #[must_use]
    pub fn liveness() -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: SERVICE_NAME.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }
}

/// Health routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health routes; they need no shared state
    pub fn routes() -> Router {
        Router::new().route("/health", get(Self::handle_health))
    }

    async fn handle_health() -> Json<HealthResponse> {
        Json(HealthResponse::liveness())
    }
}

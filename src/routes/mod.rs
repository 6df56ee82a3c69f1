// ABOUTME: Route module organization for the portal's HTML endpoints
// ABOUTME: Route groups per role plus the shared rendering helpers and role guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Route module for Trainer Portal
//!
//! Each group is a unit struct exposing `routes(resources)`; handlers are
//! thin and delegate to [`Services`](crate::services::Services).
//! Trainer pages reject client sessions and vice versa by redirecting to `/`,
//! where the session is routed to the right dashboard.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::errors::AppError;
use crate::models::Role;
use crate::resources::ServerResources;
use crate::session::SessionContext;

/// Login, sign-up, logout and the root dispatcher
pub mod auth;
/// Client checklist and completion toggles
pub mod client;
/// Liveness endpoint
pub mod health;
/// HTML page shell and fragments
pub mod render;
/// Workout and meal plan authoring, assignment forms
pub mod trainer;

pub use auth::AuthRoutes;
pub use client::ClientRoutes;
pub use health::HealthRoutes;
pub use trainer::TrainerRoutes;

/// Session for the request when its profile carries `role`, else a redirect to `/`
pub(crate) async fn require_role(
    resources: &ServerResources,
    headers: &HeaderMap,
    role: Role,
) -> Result<SessionContext, Response> {
    match resources.session_for(headers).await {
        Ok(Some(context)) if context.role() == Some(role) => Ok(context),
        _ => Err(Redirect::to("/").into_response()),
    }
}

/// HTTP status for a form-level error
pub(crate) fn status_of(error: &AppError) -> StatusCode {
    StatusCode::from_u16(error.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

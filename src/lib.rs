// ABOUTME: Main library entry point for the Trainer Portal web application
// ABOUTME: Trainers author workouts and meal plans; clients check off daily assignments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

#![deny(unsafe_code)]

//! # Trainer Portal
//!
//! A small coaching dashboard. Trainers create workouts and meal plans and
//! assign them to clients by date; clients see today's assignments and check
//! them off. Persistence, authentication and authorization live in a hosted
//! Supabase project (Postgres with row-level security plus GoTrue auth); this
//! crate is the presentation and orchestration layer in front of it.
//!
//! ## Architecture
//!
//! - **Store**: [`store::AuthGateway`] and [`store::DataStore`] are the seams to
//!   the hosted platform, implemented over HTTP by [`store::supabase`] and
//!   in-process by [`store::memory`]
//! - **Session**: [`session::SessionContext`] is passed explicitly to every
//!   domain operation; [`session::SessionStore`] maps browser cookies to contexts
//! - **Services**: stateless domain operations returning display-ready outcomes
//! - **Routes**: server-rendered HTML dashboards for both roles
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trainer_portal::config::environment::ServerConfig;
//! use trainer_portal::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Trainer Portal will listen on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration loading from the environment and secrets file
pub mod config;

/// Tracing subscriber setup
pub mod logging;

/// Auth gateway and data store seams plus their implementations
pub mod store;

/// Per-request session context and the browser session table
pub mod session;

/// Domain operations (sign-up, CRUD, assignments, completion)
pub mod services;

/// Form payload parsing and validation
pub mod forms;

/// Cookie helpers
pub mod security;

/// Shared server state handed to every route group
pub mod resources;

/// HTTP routes and HTML rendering
pub mod routes;

/// Router assembly and the HTTP listener
pub mod server;

/// Re-export of the shared error type
pub mod errors {
    pub use portal_core::errors::{AppError, AppResult, ErrorCode};
}

/// Re-export of the shared row types
pub mod models {
    pub use portal_core::models::*;
}

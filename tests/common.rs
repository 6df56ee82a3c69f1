// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides the in-memory backend, a manual clock and seeded trainer/client sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `trainer_portal`

use std::env;
use std::sync::{Arc, Once};

use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use trainer_portal::config::environment::SessionConfig;
use trainer_portal::models::{Exercise, Meal, Role};
use trainer_portal::resources::ServerResources;
use trainer_portal::server::build_router;
use trainer_portal::services::{Clock, ManualClock, Services};
use trainer_portal::session::SessionContext;
use trainer_portal::store::memory::MemoryBackend;

static INIT_LOGGER: Once = Once::new();

/// Password used for every seeded account
pub const PASSWORD: &str = "secret123";

/// Instant the manual clock starts at
pub const START: &str = "2025-06-02T09:00:00Z";

/// Install a test subscriber when `TEST_LOG` is set
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        if let Ok(filter) = env::var("TEST_LOG") {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        }
    });
}

/// Services wired to one memory backend and a manual clock
pub struct TestPortal {
    pub backend: Arc<MemoryBackend>,
    pub clock: Arc<ManualClock>,
    pub services: Services,
}

impl TestPortal {
    pub fn new() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    pub fn with_backend(backend: MemoryBackend) -> Self {
        init_test_logging();
        let backend = Arc::new(backend);
        let start: DateTime<Utc> = START.parse().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let services = Services::new(Arc::clone(&backend) as _, Arc::clone(&backend) as _)
            .with_clock(Arc::clone(&clock) as _);
        Self {
            backend,
            clock,
            services,
        }
    }

    /// Current date on the manual clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Sign up then sign in, returning the caller's context
    pub async fn register(&self, email: &str, full_name: &str, role: Role) -> SessionContext {
        let outcome = self
            .services
            .sign_up(email, PASSWORD, full_name, role)
            .await;
        assert!(outcome.success, "sign-up failed: {}", outcome.message);
        self.services.sign_in(email, PASSWORD).await.unwrap()
    }

    pub async fn trainer(&self) -> SessionContext {
        self.register("coach@example.com", "Casey Coach", Role::Trainer)
            .await
    }

    pub async fn client(&self) -> SessionContext {
        self.register("alex@example.com", "Alex Client", Role::Client)
            .await
    }

    pub fn resources(&self) -> Arc<ServerResources> {
        Arc::new(ServerResources::new(
            self.services.clone(),
            SessionConfig {
                capacity: 100,
                max_age_secs: 3600,
                secure_cookies: false,
            },
        ))
    }

    pub fn router(&self) -> Router {
        build_router(self.resources())
    }
}

pub fn sample_exercises() -> Vec<Exercise> {
    vec![
        Exercise::new("Squat", "3", "10"),
        Exercise::new("Plank", "60s", "hold"),
    ]
}

pub fn sample_meals() -> Vec<Meal> {
    vec![
        Meal::new("Breakfast", "8:00 AM", "Oats, berries"),
        Meal::new("Lunch", "12:30 PM", "Chicken salad"),
    ]
}

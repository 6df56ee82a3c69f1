// ABOUTME: Domain operations translating UI intents into auth gateway and data store calls
// ABOUTME: Outcomes are display-ready: writes report (success, message), reads degrade to empty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! # Domain operations
//!
//! [`Services`] holds the two platform seams and a clock. Every operation that
//! acts for a user takes the caller's [`SessionContext`](crate::session::SessionContext)
//! explicitly. Failures never escape as panics or bare errors into the view:
//!
//! - writes return [`ActionOutcome`]
//! - reads return [`Listing`], empty plus an inline error when the store fails
//! - completion toggles return [`CompletionToggle`]
//!
//! Sign-in is the exception: it yields the new session context or the
//! provider's message.

use std::sync::Arc;

use crate::models::{MealAssignment, WorkoutAssignment};
use crate::store::{AuthGateway, DataStore};

/// Assignment creation, today's checklist and completion toggles
pub mod assignments;
/// Sign-up, sign-in and sign-out
pub mod auth;
/// Time source
pub mod clock;
/// Connection smoke test against the hosted project
pub mod connection;
/// Workout and meal plan authoring
pub mod plans;
/// Client listing
pub mod roster;

pub use clock::{Clock, ManualClock, SystemClock};

/// Result of a write operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the write went through
    pub success: bool,
    /// Message for the form
    pub message: String,
}

impl ActionOutcome {
    /// Successful write
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed write
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of a read operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Rows, empty when the read failed
    pub items: Vec<T>,
    /// Inline error notice, set when the read failed
    pub error: Option<String>,
}

impl<T> Listing<T> {
    /// Successful read
    #[must_use]
    pub const fn ok(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    /// Failed read degraded to an empty list
    #[must_use]
    pub const fn degraded(error: String) -> Self {
        Self {
            items: Vec::new(),
            error: Some(error),
        }
    }

    /// True when there is nothing to show
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Today's checklist for one client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodayAssignments {
    /// Workout assignments with their workouts embedded
    pub workouts: Vec<WorkoutAssignment>,
    /// Meal assignments with their meal plans embedded
    pub meals: Vec<MealAssignment>,
    /// Inline error notice; both lists are empty when set
    pub error: Option<String>,
}

/// Result of a completion toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionToggle {
    /// Whether the update was sent successfully
    pub updated: bool,
    /// Error notice when it was not
    pub error: Option<String>,
}

/// Domain operations over the hosted platform
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn DataStore>,
    clock: Arc<dyn Clock>,
}

impl Services {
    /// Services on the wall clock
    #[must_use]
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn DataStore>) -> Self {
        Self {
            auth,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Time source in use
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

// ABOUTME: Seams to the hosted platform: the auth gateway and the row-level data store
// ABOUTME: Query/Filter describe PostgREST-style equality reads with optional embedded parents
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! # Store
//!
//! Everything the portal persists lives in the hosted platform. This module
//! defines the two traits the rest of the crate talks to:
//!
//! - [`AuthGateway`] exchanges email/password credentials for sessions
//! - [`DataStore`] reads and writes table rows on behalf of a caller's access
//!   token, so the platform's row-level policies decide what the caller sees
//!
//! [`supabase::SupabaseClient`] implements both over HTTP;
//! [`memory::MemoryBackend`] implements both in-process.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppResult;

/// In-process backend mirroring the hosted platform
pub mod memory;
/// HTTP client for Supabase auth and REST endpoints
pub mod supabase;

/// The five remote tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `profiles`
    Profiles,
    /// `workouts`
    Workouts,
    /// `meal_plans`
    MealPlans,
    /// `workout_assignments`
    WorkoutAssignments,
    /// `meal_assignments`
    MealAssignments,
}

impl Table {
    /// Every table, in dependency order
    pub const ALL: [Self; 5] = [
        Self::Profiles,
        Self::Workouts,
        Self::MealPlans,
        Self::WorkoutAssignments,
        Self::MealAssignments,
    ];

    /// Remote table name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Workouts => "workouts",
            Self::MealPlans => "meal_plans",
            Self::WorkoutAssignments => "workout_assignments",
            Self::MealAssignments => "meal_assignments",
        }
    }

    /// Column on `self` that references `parent`, if any
    #[must_use]
    pub const fn foreign_key_to(self, parent: Self) -> Option<&'static str> {
        match (self, parent) {
            (Self::WorkoutAssignments, Self::Workouts) => Some("workout_id"),
            (Self::MealAssignments, Self::MealPlans) => Some("meal_plan_id"),
            (Self::Workouts | Self::MealPlans, Self::Profiles) => Some("trainer_id"),
            (Self::WorkoutAssignments | Self::MealAssignments, Self::Profiles) => {
                Some("client_id")
            }
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Column name
    pub column: &'static str,
    /// Value compared as text
    pub value: String,
}

impl Filter {
    /// `column = value`
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// True when `row[column]` renders to the filter value
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Read request against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Table to read
    pub table: Table,
    /// Conjunction of equality filters
    pub filters: Vec<Filter>,
    /// Parent table to embed under its table name
    pub embed: Option<Table>,
}

impl Query {
    /// Select all columns of `table`
    #[must_use]
    pub const fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            embed: None,
        }
    }

    /// Add an equality filter
    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Embed the referenced parent row
    #[must_use]
    pub const fn embed(mut self, parent: Table) -> Self {
        self.embed = Some(parent);
        self
    }

    /// PostgREST `select` clause, e.g. `*,workouts(*)`
    #[must_use]
    pub fn select_clause(&self) -> String {
        self.embed
            .map_or_else(|| "*".to_owned(), |parent| format!("*,{parent}(*)"))
    }
}

/// Bearer token identifying the caller to the store
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token issued by the auth gateway
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// No user token; the store falls back to the project API key
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(String::new())
    }

    /// Raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for [`AccessToken::anonymous`]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            f.write_str("AccessToken(anonymous)")
        } else {
            f.write_str("AccessToken(***)")
        }
    }
}

/// Long-lived token exchanged for a fresh access token
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Wrap a refresh token issued by the auth gateway
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}

/// Identity returned by the auth gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity id, shared with the profile row
    pub id: Uuid,
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// Metadata captured at sign-up (`full_name`, `role`)
    #[serde(default)]
    pub user_metadata: Value,
}

/// Active session issued by the auth gateway
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent store calls
    pub access_token: String,
    /// Token for renewing the session before `expires_in` elapses
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Authenticated identity
    pub user: AuthUser,
}

/// Metadata attached to a new identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpMetadata {
    /// Display name
    pub full_name: String,
    /// `trainer` or `client`
    pub role: String,
}

/// Result of a sign-up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Provider issued a session immediately
    Session(AuthSession),
    /// Provider requires the email to be confirmed first
    ConfirmationRequired(AuthUser),
}

/// Email/password identity provider
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create an identity carrying `metadata`
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> AppResult<SignUpOutcome>;

    /// Exchange credentials for a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Exchange a refresh token for a new session; the old refresh token is consumed
    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<AuthSession>;

    /// Invalidate the session behind `token`
    async fn sign_out(&self, token: &AccessToken) -> AppResult<()>;
}

/// Row access subject to the platform's row-level policies
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows matching `query`
    async fn select(&self, token: &AccessToken, query: &Query) -> AppResult<Vec<Value>>;

    /// Insert one row
    async fn insert(&self, token: &AccessToken, table: Table, row: Value) -> AppResult<()>;

    /// Apply `patch` to every visible row matching `filters`
    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> AppResult<()>;

    /// Delete every visible row matching `filters`
    async fn delete(&self, token: &AccessToken, table: Table, filters: &[Filter]) -> AppResult<()>;
}

/// Run `query` and deserialize each row as `T`
///
/// Rows that do not match `T` are logged and skipped so one bad row does not
/// hide the rest of the listing.
///
/// # Errors
///
/// Propagates store failures.
pub async fn fetch_rows<T: DeserializeOwned>(
    store: &dyn DataStore,
    token: &AccessToken,
    query: &Query,
) -> AppResult<Vec<T>> {
    Ok(store
        .select(token, query)
        .await?
        .into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            serde_json::from_value(row)
                .inspect_err(|e| {
                    warn!(table = %query.table, row_id = %id, error = %e, "Skipping malformed row");
                })
                .ok()
        })
        .collect())
}

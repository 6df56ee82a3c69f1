// ABOUTME: In-process auth gateway and data store with Supabase-equivalent observable behavior
// ABOUTME: Models the profile trigger, email confirmation, row ownership policies and cascades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! # Memory backend
//!
//! A single [`MemoryBackend`] implements both [`AuthGateway`] and
//! [`DataStore`]. It reproduces what the portal can observe from the hosted
//! project carrying `supabase/schema.sql`:
//!
//! - sign-up inserts a `profiles` row from the identity metadata
//! - optional email confirmation blocks sign-in until [`MemoryBackend::confirm_email`]
//! - refresh tokens are single use; [`MemoryBackend::expire_access_tokens`]
//!   stands in for the access token lifetime running out
//! - reads return only rows the caller may see; writes touch only rows the
//!   caller owns, and silently skip the rest
//! - deleting a workout or meal plan cascades to its assignments
//!
//! [`MemoryBackend::fail_next`] makes the next call fail, for exercising the
//! degraded paths.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    AccessToken, AuthGateway, AuthSession, AuthUser, DataStore, Filter, Query, RefreshToken,
    SignUpMetadata, SignUpOutcome, Table,
};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Supabase";
const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
    tables: HashMap<Table, Vec<Value>>,
    pending_failure: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Caller {
    Anonymous,
    User { id: Uuid, trainer: bool },
}

impl Caller {
    const fn id(self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(id),
        }
    }
}

/// In-process stand-in for a Supabase project
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
    require_confirmation: bool,
}

impl MemoryBackend {
    /// Backend that issues sessions immediately on sign-up
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require email confirmation before sign-in
    #[must_use]
    pub fn with_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Mark the account for `email` as confirmed; false if no such account
    pub async fn confirm_email(&self, email: &str) -> bool {
        let mut state = self.state.write().await;
        state
            .accounts
            .get_mut(&normalize_email(email))
            .map(|account| account.confirmed = true)
            .is_some()
    }

    /// Make the next gateway or store call fail with `message`
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.state.write().await.pending_failure = Some(message.into());
    }

    /// Reject every access token issued so far; refresh tokens stay valid
    pub async fn expire_access_tokens(&self) {
        self.state.write().await.sessions.clear();
    }

    /// Snapshot of every row in `table`, bypassing row policies
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.state
            .read()
            .await
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Delete a profile row directly, leaving the identity in place
    pub async fn remove_profile(&self, id: Uuid) {
        let mut state = self.state.write().await;
        if let Some(rows) = state.tables.get_mut(&Table::Profiles) {
            rows.retain(|row| !Filter::eq("id", id).matches(row));
        }
    }

    fn take_failure(state: &mut State) -> Option<String> {
        state.pending_failure.take()
    }

    fn issue_session(state: &mut State, user: AuthUser) -> AuthSession {
        let token = format!("mem-{}", Uuid::new_v4());
        let refresh_token = Uuid::new_v4().to_string();
        state.sessions.insert(token.clone(), user.id);
        state.refresh_tokens.insert(refresh_token.clone(), user.id);
        AuthSession {
            access_token: token,
            refresh_token: Some(refresh_token),
            expires_in: Some(SESSION_TTL_SECS),
            user,
        }
    }

    fn resolve_caller(state: &State, token: &AccessToken) -> AppResult<Caller> {
        if token.is_anonymous() {
            return Ok(Caller::Anonymous);
        }
        let id = state
            .sessions
            .get(token.as_str())
            .copied()
            .ok_or_else(|| AppError::external_service(SERVICE, "JWT expired"))?;
        let trainer = find(state, Table::Profiles, "id", &id.to_string())
            .and_then(|profile| profile.get("role").and_then(Value::as_str))
            == Some("trainer");
        Ok(Caller::User { id, trainer })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn find<'a>(state: &'a State, table: Table, column: &'static str, value: &str) -> Option<&'a Value> {
    let filter = Filter::eq(column, value);
    state
        .tables
        .get(&table)
        .and_then(|rows| rows.iter().find(|row| filter.matches(row)))
}

fn owns(row: &Value, column: &str, caller: Caller) -> bool {
    caller.id().is_some_and(|id| {
        row.get(column).and_then(Value::as_str) == Some(id.to_string().as_str())
    })
}

const fn plan_table(table: Table) -> Option<(Table, &'static str)> {
    match table {
        Table::WorkoutAssignments => Some((Table::Workouts, "workout_id")),
        Table::MealAssignments => Some((Table::MealPlans, "meal_plan_id")),
        _ => None,
    }
}

const fn assignment_table(plans: Table) -> Option<(Table, &'static str)> {
    match plans {
        Table::Workouts => Some((Table::WorkoutAssignments, "workout_id")),
        Table::MealPlans => Some((Table::MealAssignments, "meal_plan_id")),
        _ => None,
    }
}

/// Read policy
fn visible(state: &State, table: Table, row: &Value, caller: Caller) -> bool {
    let Some(caller_id) = caller.id() else {
        return false;
    };
    match table {
        Table::Profiles => true,
        Table::Workouts | Table::MealPlans => {
            owns(row, "trainer_id", caller)
                || assignment_table(table).is_some_and(|(assignments, column)| {
                    let plan_id = row.get("id").and_then(Value::as_str).unwrap_or_default();
                    state.tables.get(&assignments).is_some_and(|rows| {
                        rows.iter().any(|a| {
                            a.get(column).and_then(Value::as_str) == Some(plan_id)
                                && Filter::eq("client_id", caller_id).matches(a)
                        })
                    })
                })
        }
        Table::WorkoutAssignments | Table::MealAssignments => {
            owns(row, "client_id", caller)
                || plan_table(table).is_some_and(|(plans, column)| {
                    row.get(column)
                        .and_then(Value::as_str)
                        .and_then(|plan_id| find(state, plans, "id", plan_id))
                        .is_some_and(|plan| owns(plan, "trainer_id", caller))
                })
        }
    }
}

/// Update policy
fn updatable(table: Table, row: &Value, caller: Caller) -> bool {
    match table {
        Table::Profiles => owns(row, "id", caller),
        Table::Workouts | Table::MealPlans => owns(row, "trainer_id", caller),
        Table::WorkoutAssignments | Table::MealAssignments => owns(row, "client_id", caller),
    }
}

/// Delete policy
fn deletable(table: Table, row: &Value, caller: Caller) -> bool {
    match table {
        Table::Workouts | Table::MealPlans => owns(row, "trainer_id", caller),
        _ => false,
    }
}

const fn required_columns(table: Table) -> &'static [&'static str] {
    match table {
        Table::Profiles => &["id"],
        Table::Workouts | Table::MealPlans => &["trainer_id", "title"],
        Table::WorkoutAssignments => &["workout_id", "client_id", "assigned_date"],
        Table::MealAssignments => &["meal_plan_id", "client_id", "assigned_date"],
    }
}

fn rls_violation(table: Table) -> AppError {
    AppError::external_service(
        SERVICE,
        format!("new row violates row-level security policy for table \"{table}\""),
    )
}

/// Insert policy plus the not-null and foreign-key checks the schema carries
fn check_insert(state: &State, table: Table, row: &Map<String, Value>, caller: Caller) -> AppResult<()> {
    for column in required_columns(table) {
        if row.get(*column).map_or(true, Value::is_null) {
            return Err(AppError::external_service(
                SERVICE,
                format!(
                    "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                ),
            ));
        }
    }
    let row_value = Value::Object(row.clone());
    let allowed = match (table, caller) {
        (_, Caller::Anonymous) => false,
        (Table::Profiles, _) => owns(&row_value, "id", caller),
        (Table::Workouts | Table::MealPlans, Caller::User { trainer, .. }) => {
            trainer && owns(&row_value, "trainer_id", caller)
        }
        (Table::WorkoutAssignments | Table::MealAssignments, Caller::User { trainer, .. }) => {
            trainer
                && plan_table(table).is_some_and(|(plans, column)| {
                    row.get(column)
                        .and_then(Value::as_str)
                        .and_then(|plan_id| find(state, plans, "id", plan_id))
                        .is_some_and(|plan| owns(plan, "trainer_id", caller))
                })
        }
    };
    if !allowed {
        return Err(rls_violation(table));
    }
    if plan_table(table).is_some() {
        let client = row.get("client_id").and_then(Value::as_str).unwrap_or_default();
        if find(state, Table::Profiles, "id", client).is_none() {
            return Err(AppError::external_service(
                SERVICE,
                format!(
                    "insert or update on table \"{table}\" violates foreign key constraint \"{table}_client_id_fkey\""
                ),
            ));
        }
    }
    Ok(())
}

fn fill_defaults(table: Table, row: &mut Map<String, Value>) {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    if plan_table(table).is_some() {
        row.entry("completed").or_insert(Value::Bool(false));
        row.entry("completed_at").or_insert(Value::Null);
    }
}

fn embed_parent(state: &State, table: Table, parent: Table, row: &mut Value, caller: Caller) {
    let Some(column) = table.foreign_key_to(parent) else {
        return;
    };
    let embedded = row
        .get(column)
        .and_then(Value::as_str)
        .and_then(|id| find(state, parent, "id", id))
        .filter(|parent_row| visible(state, parent, parent_row, caller))
        .cloned()
        .unwrap_or(Value::Null);
    if let Value::Object(map) = row {
        map.insert(parent.as_str().to_owned(), embedded);
    }
}

#[async_trait]
impl AuthGateway for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> AppResult<SignUpOutcome> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::auth_invalid(message));
        }
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AppError::auth_invalid(
                "Unable to validate email address: invalid format",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::auth_invalid(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        if state.accounts.contains_key(&email) {
            return Err(AppError::auth_invalid("User already registered"));
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.clone()),
            user_metadata: serde_json::to_value(metadata)?,
        };
        // Profile creation trigger on auth.users
        let profile = serde_json::json!({
            "id": user.id.to_string(),
            "full_name": metadata.full_name,
            "role": metadata.role,
            "email": email,
            "created_at": Utc::now().to_rfc3339(),
        });
        state.tables.entry(Table::Profiles).or_default().push(profile);
        state.accounts.insert(
            email.clone(),
            Account {
                user: user.clone(),
                password: password.to_owned(),
                confirmed: !self.require_confirmation,
            },
        );
        debug!(user_id = %user.id, "Registered identity");

        if self.require_confirmation {
            Ok(SignUpOutcome::ConfirmationRequired(user))
        } else {
            Ok(SignUpOutcome::Session(Self::issue_session(&mut state, user)))
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::auth_invalid(message));
        }
        let account = state
            .accounts
            .get(&normalize_email(email))
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(|| AppError::auth_invalid("Invalid login credentials"))?;
        if !account.confirmed {
            return Err(AppError::auth_invalid("Email not confirmed"));
        }
        Ok(Self::issue_session(&mut state, account.user))
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<AuthSession> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::auth_invalid(message));
        }
        let user_id = state
            .refresh_tokens
            .remove(refresh_token.as_str())
            .ok_or_else(|| AppError::auth_invalid("Invalid Refresh Token: Refresh Token Not Found"))?;
        let user = state
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or_else(|| AppError::auth_invalid("User not found"))?;
        Ok(Self::issue_session(&mut state, user))
    }

    async fn sign_out(&self, token: &AccessToken) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::auth_invalid(message));
        }
        if let Some(user_id) = state.sessions.remove(token.as_str()) {
            state.refresh_tokens.retain(|_, owner| *owner != user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryBackend {
    async fn select(&self, token: &AccessToken, query: &Query) -> AppResult<Vec<Value>> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::external_service(SERVICE, message));
        }
        let state = &*state;
        let caller = Self::resolve_caller(state, token)?;
        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .filter(|row| visible(state, query.table, row, caller))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(parent) = query.embed {
            for row in &mut rows {
                embed_parent(state, query.table, parent, row, caller);
            }
        }
        Ok(rows)
    }

    async fn insert(&self, token: &AccessToken, table: Table, row: Value) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::external_service(SERVICE, message));
        }
        let caller = Self::resolve_caller(&state, token)?;
        let Value::Object(mut row) = row else {
            return Err(AppError::external_service(
                SERVICE,
                "Insert payload must be a JSON object",
            ));
        };
        check_insert(&state, table, &row, caller)?;
        fill_defaults(table, &mut row);
        state.tables.entry(table).or_default().push(Value::Object(row));
        Ok(())
    }

    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::external_service(SERVICE, message));
        }
        let caller = Self::resolve_caller(&state, token)?;
        let Value::Object(patch) = patch else {
            return Err(AppError::external_service(
                SERVICE,
                "Update payload must be a JSON object",
            ));
        };
        if let Some(rows) = state.tables.get_mut(&table) {
            for row in rows
                .iter_mut()
                .filter(|row| filters.iter().all(|f| f.matches(row)))
                .filter(|row| updatable(table, row, caller))
            {
                if let Value::Object(map) = row {
                    map.extend(patch.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, token: &AccessToken, table: Table, filters: &[Filter]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(message) = Self::take_failure(&mut state) {
            return Err(AppError::external_service(SERVICE, message));
        }
        let caller = Self::resolve_caller(&state, token)?;
        let mut removed = Vec::new();
        if let Some(rows) = state.tables.get_mut(&table) {
            rows.retain(|row| {
                let hit = filters.iter().all(|f| f.matches(row)) && deletable(table, row, caller);
                if hit {
                    if let Some(id) = row.get("id").and_then(Value::as_str) {
                        removed.push(id.to_owned());
                    }
                }
                !hit
            });
        }
        // ON DELETE CASCADE
        if let Some((assignments, column)) = assignment_table(table) {
            if let Some(rows) = state.tables.get_mut(&assignments) {
                rows.retain(|row| {
                    row.get(column)
                        .and_then(Value::as_str)
                        .map_or(true, |plan_id| !removed.iter().any(|id| id == plan_id))
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata(role: &str) -> SignUpMetadata {
        SignUpMetadata {
            full_name: "Sam Lee".to_owned(),
            role: role.to_owned(),
        }
    }

    async fn session(backend: &MemoryBackend, email: &str, role: &str) -> AuthSession {
        match backend
            .sign_up(email, "secret123", &metadata(role))
            .await
            .unwrap()
        {
            SignUpOutcome::Session(session) => session,
            SignUpOutcome::ConfirmationRequired(_) => panic!("expected a session"),
        }
    }

    #[tokio::test]
    async fn sign_up_runs_profile_trigger() {
        let backend = MemoryBackend::new();
        let session = session(&backend, "Sam@Example.com", "trainer").await;
        let profiles = backend.rows(Table::Profiles).await;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["id"], json!(session.user.id.to_string()));
        assert_eq!(profiles[0]["role"], json!("trainer"));
        assert_eq!(profiles[0]["email"], json!("sam@example.com"));
    }

    #[tokio::test]
    async fn duplicate_and_short_password_are_rejected() {
        let backend = MemoryBackend::new();
        session(&backend, "a@example.com", "client").await;
        let err = backend
            .sign_up("a@example.com", "secret123", &metadata("client"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "User already registered");

        let err = backend
            .sign_up("b@example.com", "123", &metadata("client"))
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Password should be at least 6"));
    }

    #[tokio::test]
    async fn confirmation_mode_blocks_sign_in_until_confirmed() {
        let backend = MemoryBackend::new().with_email_confirmation();
        let outcome = backend
            .sign_up("c@example.com", "secret123", &metadata("client"))
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired(_)));

        let err = backend
            .sign_in_with_password("c@example.com", "secret123")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Email not confirmed");

        assert!(backend.confirm_email("c@example.com").await);
        backend
            .sign_in_with_password("c@example.com", "secret123")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_tokens_are_single_use() {
        let backend = MemoryBackend::new();
        let first = session(&backend, "r@example.com", "client").await;
        let refresh = RefreshToken::new(first.refresh_token.clone().unwrap());
        backend.expire_access_tokens().await;

        let err = backend
            .select(&AccessToken::new(first.access_token), &Query::table(Table::Profiles))
            .await
            .unwrap_err();
        assert_eq!(err.message, "JWT expired");

        let renewed = backend.refresh_session(&refresh).await.unwrap();
        assert_eq!(renewed.user.id, first.user.id);
        assert_eq!(
            backend
                .select(&AccessToken::new(renewed.access_token), &Query::table(Table::Profiles))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(backend.refresh_session(&refresh).await.is_err());
    }

    #[tokio::test]
    async fn writes_skip_rows_owned_by_others() {
        let backend = MemoryBackend::new();
        let owner = session(&backend, "owner@example.com", "trainer").await;
        let other = session(&backend, "other@example.com", "trainer").await;
        let owner_token = AccessToken::new(owner.access_token);
        let other_token = AccessToken::new(other.access_token);

        backend
            .insert(
                &owner_token,
                Table::Workouts,
                json!({ "trainer_id": owner.user.id, "title": "Leg Day", "exercises": [] }),
            )
            .await
            .unwrap();
        let id = backend.rows(Table::Workouts).await[0]["id"].clone();
        let id = id.as_str().unwrap().to_owned();

        backend
            .delete(&other_token, Table::Workouts, &[Filter::eq("id", &id)])
            .await
            .unwrap();
        assert_eq!(backend.rows(Table::Workouts).await.len(), 1);

        let visible = backend
            .select(&other_token, &Query::table(Table::Workouts))
            .await
            .unwrap();
        assert!(visible.is_empty());

        backend
            .delete(&owner_token, Table::Workouts, &[Filter::eq("id", &id)])
            .await
            .unwrap();
        assert!(backend.rows(Table::Workouts).await.is_empty());
    }

    #[tokio::test]
    async fn insert_for_another_trainer_violates_policy() {
        let backend = MemoryBackend::new();
        let trainer = session(&backend, "t@example.com", "trainer").await;
        let err = backend
            .insert(
                &AccessToken::new(trainer.access_token),
                Table::MealPlans,
                json!({ "trainer_id": Uuid::new_v4(), "title": "Cut", "meals": [] }),
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("row-level security"));
    }

    #[tokio::test]
    async fn fail_next_affects_exactly_one_call() {
        let backend = MemoryBackend::new();
        let trainer = session(&backend, "t@example.com", "trainer").await;
        let token = AccessToken::new(trainer.access_token);
        backend.fail_next("connection reset").await;
        let err = backend
            .select(&token, &Query::table(Table::Profiles))
            .await
            .unwrap_err();
        assert_eq!(err.message, "connection reset");
        assert_eq!(
            backend
                .select(&token, &Query::table(Table::Profiles))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn anonymous_caller_sees_no_rows() {
        let backend = MemoryBackend::new();
        session(&backend, "t@example.com", "trainer").await;
        let rows = backend
            .select(&AccessToken::anonymous(), &Query::table(Table::Profiles))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}

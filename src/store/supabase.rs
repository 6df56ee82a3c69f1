// ABOUTME: Supabase HTTP client implementing the auth gateway (GoTrue) and data store (PostgREST)
// ABOUTME: Provider error bodies are reduced to their raw message for display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Supabase client
//!
//! Auth calls go to `/auth/v1/*`, row access to `/rest/v1/{table}`. Every
//! request carries the project API key in the `apikey` header; row access
//! additionally sends the caller's access token as the bearer so the
//! platform's row-level security policies apply to it.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{
    AccessToken, AuthGateway, AuthSession, AuthUser, DataStore, Filter, Query, RefreshToken,
    SignUpMetadata, SignUpOutcome, Table,
};
use crate::config::environment::SupabaseConfig;
use crate::errors::{AppError, AppResult};

const AUTH_SERVICE: &str = "Supabase Auth";
const REST_SERVICE: &str = "Supabase";

/// HTTP client for one Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Build a client with the configured request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.url.as_str().trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str, token: &AccessToken) -> RequestBuilder {
        let bearer = if token.is_anonymous() {
            self.api_key.as_str()
        } else {
            token.as_str()
        };
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    fn rest(&self, method: Method, table: Table, token: &AccessToken) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"), token)
    }

    async fn send_auth(&self, builder: RequestBuilder) -> AppResult<Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::external_service(AUTH_SERVICE, e.to_string()))?;
        let status = response.status();
        let body = response_text(response, AUTH_SERVICE).await?;
        if !status.is_success() {
            return Err(AppError::auth_invalid(provider_message(status, &body)));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(AUTH_SERVICE, format!("JSON parse error: {e}"))
        })
    }

    async fn send_rest(&self, builder: RequestBuilder) -> AppResult<String> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::external_service(REST_SERVICE, e.to_string()))?;
        let status = response.status();
        let body = response_text(response, REST_SERVICE).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(AppError::external_service(
                REST_SERVICE,
                provider_message(status, &body),
            ))
        }
    }
}

async fn response_text(response: Response, service: &str) -> AppResult<String> {
    response
        .text()
        .await
        .map_err(|e| AppError::external_service(service, e.to_string()))
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.to_owned(), format!("eq.{}", f.value)))
        .collect()
}

/// Reduce a provider error response to its human-readable message
///
/// Supabase services disagree on the key: GoTrue uses `msg` or
/// `error_description`, PostgREST uses `message`, older endpoints `error`.
#[must_use]
pub fn provider_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return message.clone();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with HTTP {status}")
    } else {
        trimmed.to_owned()
    }
}

fn parse_session(body: Value) -> AppResult<AuthSession> {
    serde_json::from_value(body)
        .map_err(|e| AppError::external_service(AUTH_SERVICE, format!("JSON parse error: {e}")))
}

/// Interpret a successful `/auth/v1/signup` response
///
/// With auto-confirm the body is a session; with email confirmation enabled
/// it is the bare user, or `{ "user": ..., "session": null }`.
///
/// # Errors
///
/// Returns an error when the body carries neither a session nor a user.
pub fn parse_sign_up(body: Value) -> AppResult<SignUpOutcome> {
    let parse_err =
        |e: serde_json::Error| AppError::external_service(AUTH_SERVICE, format!("JSON parse error: {e}"));

    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body).map_err(parse_err)?;
        return Ok(SignUpOutcome::Session(session));
    }
    if let Some(session) = body.get("session").filter(|s| s.is_object()) {
        let session: AuthSession = serde_json::from_value(session.clone()).map_err(parse_err)?;
        return Ok(SignUpOutcome::Session(session));
    }
    if let Some(user) = body.get("user").filter(|u| u.is_object()) {
        let user: AuthUser = serde_json::from_value(user.clone()).map_err(parse_err)?;
        return Ok(SignUpOutcome::ConfirmationRequired(user));
    }
    if body.get("id").is_some() {
        let user: AuthUser = serde_json::from_value(body).map_err(parse_err)?;
        return Ok(SignUpOutcome::ConfirmationRequired(user));
    }
    Err(AppError::auth_invalid("Failed to create account"))
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    #[instrument(skip(self, password, metadata), fields(role = %metadata.role))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> AppResult<SignUpOutcome> {
        let builder = self
            .request(Method::POST, "/auth/v1/signup", &AccessToken::anonymous())
            .json(&json!({
                "email": email,
                "password": password,
                "data": metadata,
            }));
        parse_sign_up(self.send_auth(builder).await?)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let builder = self
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                &AccessToken::anonymous(),
            )
            .json(&json!({ "email": email, "password": password }));
        parse_session(self.send_auth(builder).await?)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<AuthSession> {
        let builder = self
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=refresh_token",
                &AccessToken::anonymous(),
            )
            .json(&json!({ "refresh_token": refresh_token.as_str() }));
        parse_session(self.send_auth(builder).await?)
    }

    #[instrument(skip(self, token))]
    async fn sign_out(&self, token: &AccessToken) -> AppResult<()> {
        self.send_auth(self.request(Method::POST, "/auth/v1/logout", token))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    #[instrument(skip(self, token), fields(table = %query.table))]
    async fn select(&self, token: &AccessToken, query: &Query) -> AppResult<Vec<Value>> {
        let mut params = vec![("select".to_owned(), query.select_clause())];
        params.extend(filter_params(&query.filters));
        let body = self
            .send_rest(self.rest(Method::GET, query.table, token).query(&params))
            .await?;
        let rows: Vec<Value> = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(REST_SERVICE, format!("JSON parse error: {e}"))
        })?;
        debug!(rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, token, row))]
    async fn insert(&self, token: &AccessToken, table: Table, row: Value) -> AppResult<()> {
        self.send_rest(
            self.rest(Method::POST, table, token)
                .header("Prefer", "return=minimal")
                .json(&row),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self, token, patch))]
    async fn update(
        &self,
        token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> AppResult<()> {
        self.send_rest(
            self.rest(Method::PATCH, table, token)
                .query(&filter_params(filters))
                .header("Prefer", "return=minimal")
                .json(&patch),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, token: &AccessToken, table: Table, filters: &[Filter]) -> AppResult<()> {
        self.send_rest(
            self.rest(Method::DELETE, table, token)
                .query(&filter_params(filters))
                .header("Prefer", "return=minimal"),
        )
        .await
        .map(|_| ())
    }
}

// ABOUTME: Integration tests for the Supabase HTTP client against a local mock project
// ABOUTME: Verifies endpoints, headers, PostgREST query encoding and provider error reduction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use trainer_portal::config::environment::SupabaseConfig;
use trainer_portal::errors::ErrorCode;
use trainer_portal::models::Role;
use trainer_portal::services::auth::AUTH_CONFIG_ERROR;
use trainer_portal::services::Services;
use trainer_portal::store::supabase::SupabaseClient;
use trainer_portal::store::{
    AccessToken, AuthGateway, DataStore, Filter, Query, RefreshToken, Table,
};
use url::Url;
use uuid::Uuid;

const API_KEY: &str = "anon-key";
const USER_TOKEN: &str = "user-jwt";

// ============================================================================
// Mock project
// ============================================================================

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Log = Arc<Mutex<Vec<Captured>>>;

fn session_body(user_id: Uuid) -> Value {
    json!({
        "access_token": USER_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": {
            "id": user_id,
            "email": "coach@example.com",
            "user_metadata": { "full_name": "Casey Coach", "role": "trainer" }
        }
    })
}

async fn mock_project(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let captured = Captured {
        method: method.clone(),
        path: uri.path().to_owned(),
        query,
        headers,
        body: body.clone(),
    };
    log.lock().await.push(captured);

    match (method, uri.path()) {
        (Method::POST, "/auth/v1/token") => {
            let request: Value = serde_json::from_str(&body).unwrap();
            if request["password"] == "secret123" || request["refresh_token"] == "refresh" {
                Json(session_body(Uuid::nil())).into_response()
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid login credentials"
                    })),
                )
                    .into_response()
            }
        }
        (Method::POST, "/auth/v1/signup") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response(),
        (Method::POST, "/auth/v1/logout") => StatusCode::NO_CONTENT.into_response(),
        (Method::GET, "/rest/v1/workout_assignments") => Json(json!([{
            "id": Uuid::nil(),
            "workout_id": Uuid::nil(),
            "client_id": Uuid::nil(),
            "assigned_date": "2025-06-02",
            "completed": false,
            "completed_at": null,
            "workouts": { "id": Uuid::nil(), "trainer_id": Uuid::nil(), "title": "Leg Day", "exercises": [] }
        }]))
        .into_response(),
        (Method::GET, "/rest/v1/profiles") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "message": "Invalid API key",
                "hint": "Double check your Supabase `anon` or `service_role` API key."
            })),
        )
            .into_response(),
        (Method::PATCH | Method::POST | Method::DELETE, _) => StatusCode::NO_CONTENT.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_mock() -> (SupabaseClient, Log) {
    common::init_test_logging();
    let log: Log = Arc::default();
    let app = Router::new()
        .fallback(mock_project)
        .with_state(Arc::clone(&log));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = SupabaseClient::new(&SupabaseConfig {
        url: Url::parse(&format!("http://{addr}/")).unwrap(),
        api_key: API_KEY.to_owned(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    (client, log)
}

async fn last(log: &Log) -> Captured {
    log.lock().await.last().cloned().unwrap()
}

// ============================================================================
// Auth gateway
// ============================================================================

#[tokio::test]
async fn test_password_sign_in_hits_token_endpoint() {
    let (client, log) = start_mock().await;

    let session = client
        .sign_in_with_password("coach@example.com", "secret123")
        .await
        .unwrap();
    assert_eq!(session.access_token, USER_TOKEN);
    assert_eq!(session.user.user_metadata["role"], "trainer");

    let request = last(&log).await;
    assert_eq!(request.path, "/auth/v1/token");
    assert_eq!(request.param("grant_type"), Some("password"));
    assert_eq!(request.header("apikey"), Some(API_KEY));
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {API_KEY}").as_str())
    );
}

#[tokio::test]
async fn test_rejected_credentials_surface_provider_message() {
    let (client, _log) = start_mock().await;

    let err = client
        .sign_in_with_password("coach@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    assert_eq!(err.message, "Invalid login credentials");
}

#[tokio::test]
async fn test_sign_up_with_rejected_key_reports_configuration_error() {
    let (client, log) = start_mock().await;
    let client = Arc::new(client);
    let services = Services::new(Arc::clone(&client) as _, client);

    let outcome = services
        .sign_up("coach@example.com", "secret123", "Casey Coach", Role::Trainer)
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, AUTH_CONFIG_ERROR);

    let request = last(&log).await;
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["data"]["full_name"], "Casey Coach");
    assert_eq!(body["data"]["role"], "trainer");
}

#[tokio::test]
async fn test_refresh_posts_refresh_token_grant() {
    let (client, log) = start_mock().await;

    let session = client
        .refresh_session(&RefreshToken::new("refresh"))
        .await
        .unwrap();
    assert_eq!(session.access_token, USER_TOKEN);
    assert_eq!(session.expires_in, Some(3600));

    let request = last(&log).await;
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/auth/v1/token");
    assert_eq!(request.param("grant_type"), Some("refresh_token"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({ "refresh_token": "refresh" }));

    let err = client
        .refresh_session(&RefreshToken::new("revoked"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_sign_out_sends_user_token() {
    let (client, log) = start_mock().await;

    client.sign_out(&AccessToken::new(USER_TOKEN)).await.unwrap();
    let request = last(&log).await;
    assert_eq!(request.path, "/auth/v1/logout");
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {USER_TOKEN}").as_str())
    );
}

// ============================================================================
// Data store
// ============================================================================

#[tokio::test]
async fn test_select_encodes_filters_and_embedding() {
    let (client, log) = start_mock().await;
    let client_id = Uuid::new_v4();

    let rows = client
        .select(
            &AccessToken::new(USER_TOKEN),
            &Query::table(Table::WorkoutAssignments)
                .eq("client_id", client_id)
                .eq("assigned_date", "2025-06-02")
                .embed(Table::Workouts),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["workouts"]["title"], "Leg Day");

    let request = last(&log).await;
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.param("select"), Some("*,workouts(*)"));
    assert_eq!(
        request.param("client_id"),
        Some(format!("eq.{client_id}").as_str())
    );
    assert_eq!(request.param("assigned_date"), Some("eq.2025-06-02"));
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {USER_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn test_update_patches_with_minimal_return() {
    let (client, log) = start_mock().await;
    let id = Uuid::new_v4();

    client
        .update(
            &AccessToken::new(USER_TOKEN),
            Table::MealAssignments,
            &[Filter::eq("id", id)],
            json!({ "completed": true, "completed_at": "2025-06-02T09:00:00Z" }),
        )
        .await
        .unwrap();

    let request = last(&log).await;
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/rest/v1/meal_assignments");
    assert_eq!(request.param("id"), Some(format!("eq.{id}").as_str()));
    assert_eq!(request.header("prefer"), Some("return=minimal"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["completed"], true);
}

#[tokio::test]
async fn test_rest_errors_carry_provider_message() {
    let (client, _log) = start_mock().await;

    let err = client
        .select(&AccessToken::anonymous(), &Query::table(Table::Profiles))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert_eq!(err.message, "Invalid API key");
}

#[tokio::test]
async fn test_check_connection_propagates_store_error() {
    let (client, _log) = start_mock().await;
    let client = Arc::new(client);
    let services = Services::new(Arc::clone(&client) as _, client);

    let err = services.check_connection().await.unwrap_err();
    assert!(err.message.contains("Invalid API key"));
}

// ABOUTME: Login, sign-up and logout handlers plus the role-based root dispatcher
// ABOUTME: Sessions without a usable profile are signed out and returned to the login page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::info;

use super::client::ClientRoutes;
use super::render::{login_page, LoginPrefill, Notice, Page};
use super::status_of;
use super::trainer::TrainerRoutes;
use crate::errors::AppError;
use crate::forms::{LoginForm, SignupForm, DEFAULT_ROWS};
use crate::resources::ServerResources;
use crate::services::auth::SIGNED_IN;
use crate::session::{SessionContext, ViewState};

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_home))
            .route("/login", post(Self::handle_login))
            .route("/signup", post(Self::handle_signup))
            .route("/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Render the dashboard for `context`'s role with `notices` on top
    async fn dashboard(
        resources: &ServerResources,
        context: &SessionContext,
        trainer: bool,
        notices: Vec<Notice>,
    ) -> Page {
        if trainer {
            TrainerRoutes::workouts_page(resources, context, DEFAULT_ROWS, notices).await
        } else {
            ClientRoutes::checklist_page(resources, context, notices).await
        }
    }

    /// Remote sign-out for a session that cannot be used; returns the notices to show
    async fn force_sign_out(
        resources: &ServerResources,
        context: &SessionContext,
        reason: &AppError,
    ) -> Vec<Notice> {
        info!(user_id = %context.user_id(), code = %reason.code, reason = %reason, "Forcing sign-out");
        let mut notices = vec![Notice::error(&reason.message)];
        if let Err(e) = resources.services.sign_out(context).await {
            notices.push(Notice::error(format!("Error signing out: {e}")));
        }
        notices
    }

    /// Handle GET / - login page or the dashboard for the session's role
    async fn handle_home(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let context = match resources.session_for(&headers).await {
            Ok(context) => context,
            Err(e) => {
                let cookie = resources.end_session(&headers).await;
                return (
                    cookie,
                    login_page(&LoginPrefill::default()).notice(Notice::error(&e.message)),
                )
                    .into_response();
            }
        };
        match ViewState::resolve(context) {
            ViewState::Anonymous => login_page(&LoginPrefill::default()).into_response(),
            ViewState::Trainer(context) => {
                Self::dashboard(&resources, &context, true, Vec::new())
                    .await
                    .into_response()
            }
            ViewState::Client(context) => {
                Self::dashboard(&resources, &context, false, Vec::new())
                    .await
                    .into_response()
            }
            ViewState::ForceSignOut(context, reason) => {
                let notices = Self::force_sign_out(&resources, &context, &reason).await;
                let cookie = resources.end_session(&headers).await;
                (
                    cookie,
                    login_page(&LoginPrefill::default()).notices(notices),
                )
                    .into_response()
            }
        }
    }

    /// Handle POST /login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Form(form): Form<LoginForm>,
    ) -> Response {
        let prefill = LoginPrefill {
            login_email: &form.email,
            ..LoginPrefill::default()
        };
        if let Err(e) = form.validate() {
            return login_page(&prefill)
                .notice(Notice::error(&e.message))
                .status(status_of(&e))
                .into_response();
        }

        let context = match resources
            .services
            .sign_in(form.email.trim(), &form.password)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                return login_page(&prefill)
                    .notice(Notice::error(&e.message))
                    .status(status_of(&e))
                    .into_response();
            }
        };

        let (context, is_trainer) = match ViewState::resolve(Some(context)) {
            ViewState::Trainer(context) => (context, true),
            ViewState::Client(context) => (context, false),
            ViewState::ForceSignOut(context, reason) => {
                let notices = Self::force_sign_out(&resources, &context, &reason).await;
                return login_page(&prefill).notices(notices).into_response();
            }
            ViewState::Anonymous => return login_page(&prefill).into_response(),
        };

        let cookie = resources.start_session(context.clone()).await;
        let page = Self::dashboard(
            &resources,
            &context,
            is_trainer,
            vec![Notice::success(SIGNED_IN)],
        )
        .await;
        (cookie, page).into_response()
    }

    /// Handle POST /signup
    async fn handle_signup(
        State(resources): State<Arc<ServerResources>>,
        Form(form): Form<SignupForm>,
    ) -> Response {
        let prefill = LoginPrefill {
            signup_email: &form.email,
            signup_full_name: &form.full_name,
            ..LoginPrefill::default()
        };
        let role = match form.validate() {
            Ok(role) => role,
            Err(e) => {
                return login_page(&prefill)
                    .notice(Notice::error(&e.message))
                    .status(status_of(&e))
                    .into_response();
            }
        };

        let outcome = resources
            .services
            .sign_up(
                form.email.trim(),
                &form.password,
                form.full_name.trim(),
                role,
            )
            .await;
        let page = if outcome.success {
            login_page(&LoginPrefill::default())
        } else {
            login_page(&prefill)
        };
        page.notice(Notice::outcome(outcome.success, outcome.message))
            .into_response()
    }

    /// Handle POST /logout - local session is dropped even if the remote call fails
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let mut notices = Vec::new();
        if let Ok(Some(context)) = resources.session_for(&headers).await {
            if let Err(e) = resources.services.sign_out(&context).await {
                notices.push(Notice::error(format!("Error signing out: {e}")));
            }
        }
        let cookie = resources.end_session(&headers).await;
        if notices.is_empty() {
            (cookie, Redirect::to("/")).into_response()
        } else {
            (
                cookie,
                login_page(&LoginPrefill::default()).notices(notices),
            )
                .into_response()
        }
    }
}

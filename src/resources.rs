// ABOUTME: Shared server state handed to every route group
// ABOUTME: Domain services, the browser session table and cookie settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use axum::http::HeaderMap;
use tracing::info;

use crate::config::environment::SessionConfig;
use crate::errors::AppResult;
use crate::security::cookies;
use crate::services::Services;
use crate::session::{SessionContext, SessionStore};

/// State shared by all handlers
pub struct ServerResources {
    /// Domain operations
    pub services: Services,
    /// Live browser sessions
    pub sessions: SessionStore,
    /// Cookie settings
    pub session_config: SessionConfig,
}

impl ServerResources {
    /// Bundle services with a session table sized from `session_config`
    #[must_use]
    pub fn new(services: Services, session_config: SessionConfig) -> Self {
        Self {
            services,
            sessions: SessionStore::new(session_config.capacity),
            session_config,
        }
    }

    /// Session context for the request's cookie, renewed when its access token is about to lapse
    ///
    /// # Errors
    ///
    /// Returns an auth-required error when renewal fails; the session has
    /// already been dropped from the table.
    pub async fn session_for(&self, headers: &HeaderMap) -> AppResult<Option<SessionContext>> {
        let Some(id) = cookies::session_id(headers) else {
            return Ok(None);
        };
        let Some(context) = self.sessions.get(id).await else {
            return Ok(None);
        };
        if !context.needs_refresh(self.services.clock().now()) {
            return Ok(Some(context));
        }
        match self.services.refresh_session(&context).await {
            Ok(renewed) => {
                self.sessions.replace(id, renewed.clone()).await;
                Ok(Some(renewed))
            }
            Err(e) => {
                info!(user_id = %context.user_id(), "Dropping session that could not be renewed");
                self.sessions.remove(id).await;
                Err(e)
            }
        }
    }

    /// Start a browser session and return the cookie headers
    pub async fn start_session(&self, context: SessionContext) -> HeaderMap {
        let id = self.sessions.insert(context).await;
        let mut headers = HeaderMap::new();
        cookies::set_session_cookie(
            &mut headers,
            id,
            self.session_config.max_age_secs,
            self.session_config.secure_cookies,
        );
        headers
    }

    /// Drop the request's browser session and return the expiring cookie headers
    pub async fn end_session(&self, headers: &HeaderMap) -> HeaderMap {
        if let Some(id) = cookies::session_id(headers) {
            self.sessions.remove(id).await;
        }
        let mut out = HeaderMap::new();
        cookies::clear_session_cookie(&mut out, self.session_config.secure_cookies);
        out
    }
}

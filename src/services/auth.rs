// ABOUTME: Sign-up, sign-in and sign-out against the auth gateway
// ABOUTME: Sign-in loads the profile row into a fresh SessionContext
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use chrono::Duration;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::{ActionOutcome, Services};
use crate::errors::{AppError, AppResult};
use crate::models::{Profile, Role};
use crate::session::SessionContext;
use crate::store::{
    fetch_rows, AccessToken, AuthSession, Filter, Query, RefreshToken, SignUpMetadata,
    SignUpOutcome, Table,
};

/// Sign-up succeeded but the email must be confirmed first
pub const CONFIRM_EMAIL: &str =
    "Account created! Please check your email and click the confirmation link to complete setup.";
/// Sign-up succeeded with an active session
pub const ACCOUNT_CREATED: &str = "Account created successfully!";
/// Sign-in succeeded
pub const SIGNED_IN: &str = "Logged in successfully!";
/// Shown instead of the provider message when the project key is rejected
pub const AUTH_CONFIG_ERROR: &str =
    "Authentication configuration error. Please check Supabase settings.";
/// The access token lapsed and could not be renewed
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

impl Services {
    /// Create an identity with `full_name` and `role` as metadata
    ///
    /// When the provider returns a session right away the profile row is
    /// updated with the same values; otherwise the user is told to confirm
    /// their email and the profile is left to the sign-up trigger.
    #[instrument(skip(self, password, full_name), fields(role = %role))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> ActionOutcome {
        let metadata = SignUpMetadata {
            full_name: full_name.to_owned(),
            role: role.as_str().to_owned(),
        };
        let result = match self.auth.sign_up(email, password, &metadata).await {
            Ok(SignUpOutcome::ConfirmationRequired(user)) => {
                info!(user_id = %user.id, "Account awaiting email confirmation");
                return ActionOutcome::ok(CONFIRM_EMAIL);
            }
            Ok(SignUpOutcome::Session(session)) => {
                self.store
                    .update(
                        &AccessToken::new(session.access_token),
                        Table::Profiles,
                        &[Filter::eq("id", session.user.id)],
                        json!({ "full_name": full_name, "role": role.as_str() }),
                    )
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => ActionOutcome::ok(ACCOUNT_CREATED),
            Err(e) if e.message.contains("Invalid API key") => {
                warn!("Auth gateway rejected the project API key");
                ActionOutcome::failed(AUTH_CONFIG_ERROR)
            }
            Err(e) => ActionOutcome::failed(format!("Error creating account: {e}")),
        }
    }

    /// Authenticate and load the caller's profile
    ///
    /// A missing profile row is not an error here; the returned context has
    /// no profile and the view forces a sign-out.
    ///
    /// # Errors
    ///
    /// Returns the provider's message on rejected credentials, or the store's
    /// message when the profile lookup fails.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionContext> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        let profile = fetch_rows::<Profile>(
            self.store.as_ref(),
            &AccessToken::new(session.access_token.as_str()),
            &Query::table(Table::Profiles).eq("id", session.user.id),
        )
        .await?
        .into_iter()
        .next();
        info!(user_id = %session.user.id, has_profile = profile.is_some(), "Signed in");
        Ok(self.context_for(session, profile))
    }

    /// Renew the access token behind `context`, keeping its cached profile
    ///
    /// # Errors
    ///
    /// Returns an auth-required error when the context carries no refresh
    /// token or the gateway rejects it; the caller must sign in again.
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn refresh_session(&self, context: &SessionContext) -> AppResult<SessionContext> {
        let Some(refresh_token) = context.refresh_token.as_ref() else {
            return Err(AppError::auth_required(SESSION_EXPIRED));
        };
        let session = self
            .auth
            .refresh_session(refresh_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Session refresh rejected");
                AppError::auth_required(SESSION_EXPIRED)
            })?;
        debug!("Access token renewed");
        Ok(self.context_for(session, context.profile.clone()))
    }

    fn context_for(&self, session: AuthSession, profile: Option<Profile>) -> SessionContext {
        let expires_at = session
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        SessionContext {
            user: session.user,
            access_token: AccessToken::new(session.access_token),
            refresh_token: session.refresh_token.map(RefreshToken::new),
            expires_at,
            profile,
        }
    }

    /// Invalidate the gateway session behind `context`
    ///
    /// Callers drop their local session whatever this returns.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, already logged.
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn sign_out(&self, context: &SessionContext) -> AppResult<()> {
        self.auth
            .sign_out(&context.access_token)
            .await
            .inspect_err(|e| warn!(error = %e, "Remote sign-out failed"))
    }
}

// ABOUTME: Explicit per-request session context and the bounded browser session table
// ABOUTME: ViewState resolves Anonymous / Trainer / Client / forced sign-out from a context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! # Session state
//!
//! A [`SessionContext`] is the authenticated identity plus its cached profile
//! row. Domain operations receive it as an argument; nothing reads ambient
//! state. Browser sessions map an opaque cookie id to a context through the
//! LRU-bounded [`SessionStore`].

use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Profile, Role};
use crate::store::{AccessToken, AuthUser, RefreshToken};

/// Message shown when an authenticated session has no profile row
pub const PROFILE_MISSING: &str = "Error loading profile. Please try logging in again.";
/// Message shown when the profile role is neither trainer nor client
pub const INVALID_ROLE: &str = "Invalid user role";
/// Access tokens are renewed this long before they expire
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Authenticated identity, its access token and its profile row
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Identity issued by the auth gateway
    pub user: AuthUser,
    /// Token presented to the data store
    pub access_token: AccessToken,
    /// Renews `access_token`; absent when the gateway issued none
    pub refresh_token: Option<RefreshToken>,
    /// When `access_token` stops being accepted, if the gateway said
    pub expires_at: Option<DateTime<Utc>>,
    /// First profile row matching the identity, if any
    pub profile: Option<Profile>,
}

impl SessionContext {
    /// Identity id
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Role from the cached profile
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().and_then(Profile::role)
    }

    /// Greeting name for dashboards; sign-up metadata stands in for a missing profile
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(profile) = &self.profile {
            return profile.display_name();
        }
        metadata_str(&self.user, "full_name")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                metadata_str(&self.user, "role")
                    .and_then(Role::parse)
                    .map_or("User", Role::title)
            })
    }

    /// True once `now` is within [`REFRESH_MARGIN_SECS`] of the token expiry
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| now >= at - Duration::seconds(REFRESH_MARGIN_SECS))
    }
}

fn metadata_str<'a>(user: &'a AuthUser, key: &str) -> Option<&'a str> {
    user.user_metadata.get(key).and_then(Value::as_str)
}

/// Which view a request renders
#[derive(Debug, Clone)]
pub enum ViewState {
    /// No session: login and sign-up forms
    Anonymous,
    /// Trainer dashboard
    Trainer(SessionContext),
    /// Client checklist
    Client(SessionContext),
    /// Session must be signed out; carries the invalid-state error to show
    ForceSignOut(SessionContext, AppError),
}

impl ViewState {
    /// Route a possibly-present context
    #[must_use]
    pub fn resolve(context: Option<SessionContext>) -> Self {
        let Some(context) = context else {
            return Self::Anonymous;
        };
        let Some(profile) = context.profile.as_ref() else {
            return Self::ForceSignOut(context, AppError::invalid_state(PROFILE_MISSING));
        };
        match profile.role() {
            Some(Role::Trainer) => Self::Trainer(context),
            Some(Role::Client) => Self::Client(context),
            None => Self::ForceSignOut(context, AppError::invalid_state(INVALID_ROLE)),
        }
    }
}

/// Live browser sessions, evicting the least recently used past capacity
pub struct SessionStore {
    sessions: Mutex<LruCache<Uuid, SessionContext>>,
}

impl SessionStore {
    /// Store holding at most `capacity` sessions (minimum one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Register a context and return its new session id
    pub async fn insert(&self, context: SessionContext) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().await.put(id, context);
        id
    }

    /// Context for `id`, refreshing its recency
    pub async fn get(&self, id: Uuid) -> Option<SessionContext> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Swap in a renewed context for `id`
    pub async fn replace(&self, id: Uuid, context: SessionContext) {
        self.sessions.lock().await.put(id, context);
    }

    /// Drop `id`, returning its context
    pub async fn remove(&self, id: Uuid) -> Option<SessionContext> {
        self.sessions.lock().await.pop(&id)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// True when no session is live
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::errors::ErrorCode;

    fn context(role: Option<&str>, with_profile: bool) -> SessionContext {
        let id = Uuid::new_v4();
        SessionContext {
            user: AuthUser {
                id,
                email: Some("x@example.com".to_owned()),
                user_metadata: Value::Null,
            },
            access_token: AccessToken::new("token"),
            refresh_token: None,
            expires_at: None,
            profile: with_profile.then(|| Profile {
                id,
                full_name: Some("Alex".to_owned()),
                role: role.map(str::to_owned),
                email: None,
            }),
        }
    }

    #[test]
    fn resolves_each_state() {
        assert!(matches!(ViewState::resolve(None), ViewState::Anonymous));
        assert!(matches!(
            ViewState::resolve(Some(context(Some("trainer"), true))),
            ViewState::Trainer(_)
        ));
        assert!(matches!(
            ViewState::resolve(Some(context(Some("client"), true))),
            ViewState::Client(_)
        ));
        assert!(matches!(
            ViewState::resolve(Some(context(Some("client"), false))),
            ViewState::ForceSignOut(_, ref e) if e.message == PROFILE_MISSING
        ));
        assert!(matches!(
            ViewState::resolve(Some(context(Some("admin"), true))),
            ViewState::ForceSignOut(_, ref e) if e.message == INVALID_ROLE
        ));
        match ViewState::resolve(Some(context(None, true))) {
            ViewState::ForceSignOut(_, e) => assert_eq!(e.code, ErrorCode::InvalidState),
            other => panic!("expected a forced sign-out, got {other:?}"),
        }
    }

    #[test]
    fn display_name_without_profile_uses_sign_up_metadata() {
        let mut trainer = context(None, false);
        trainer.user.user_metadata = json!({ "role": "trainer" });
        assert_eq!(trainer.display_name(), "Trainer");

        trainer.user.user_metadata = json!({ "role": "trainer", "full_name": "Casey" });
        assert_eq!(trainer.display_name(), "Casey");

        assert_eq!(context(None, false).display_name(), "User");
        assert_eq!(context(Some("client"), true).display_name(), "Alex");
    }

    #[test]
    fn refresh_is_due_inside_the_margin() {
        let expires = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let mut ctx = context(Some("client"), true);
        assert!(!ctx.needs_refresh(expires));

        ctx.expires_at = Some(expires);
        assert!(!ctx.needs_refresh(expires - Duration::seconds(REFRESH_MARGIN_SECS + 1)));
        assert!(ctx.needs_refresh(expires - Duration::seconds(REFRESH_MARGIN_SECS)));
        assert!(ctx.needs_refresh(expires + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn store_evicts_least_recently_used() {
        let store = SessionStore::new(2);
        let first = store.insert(context(Some("client"), true)).await;
        let second = store.insert(context(Some("client"), true)).await;
        assert!(store.get(first).await.is_some());
        let third = store.insert(context(Some("client"), true)).await;

        assert!(store.get(second).await.is_none());
        assert!(store.get(first).await.is_some());
        assert!(store.get(third).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn zero_capacity_still_holds_one_session() {
        let store = SessionStore::new(0);
        let id = store.insert(context(Some("trainer"), true)).await;
        assert!(store.remove(id).await.is_some());
        assert!(store.is_empty().await);
    }
}

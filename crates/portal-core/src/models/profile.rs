// ABOUTME: Profile row and the trainer/client role claim
// ABOUTME: Role parsing is strict; anything else is treated as an invalid session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role chosen at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Authors workouts and meal plans, assigns them to clients
    Trainer,
    /// Views and checks off daily assignments
    Client,
}

impl Role {
    /// Convert to the stored string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Client => "client",
        }
    }

    /// Capitalized name for greetings
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Trainer => "Trainer",
            Self::Client => "Client",
        }
    }

    /// Parse the stored string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trainer" => Some(Self::Trainer),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `profiles` table, keyed by the auth identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth identity
    pub id: Uuid,
    /// Display name captured at sign-up
    #[serde(default)]
    pub full_name: Option<String>,
    /// Raw role column; see [`Profile::role`]
    #[serde(default)]
    pub role: Option<String>,
    /// Email copied from the auth identity, when the schema stores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    /// Parsed role, `None` when absent or unrecognized
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    /// Name to greet the user with, falling back to the role title
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.role().map_or("User", Role::title),
        }
    }

    /// Label used in client pickers: `Full Name (email)`
    #[must_use]
    pub fn roster_label(&self) -> String {
        format!(
            "{} ({})",
            self.full_name.as_deref().unwrap_or("N/A"),
            self.email.as_deref().unwrap_or("N/A")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>, role: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: full_name.map(ToOwned::to_owned),
            role: role.map(ToOwned::to_owned),
            email: None,
        }
    }

    #[test]
    fn role_parse_is_strict() {
        assert_eq!(Role::parse("trainer"), Some(Role::Trainer));
        assert_eq!(Role::parse("client"), Some(Role::Client));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Trainer"), None);
    }

    #[test]
    fn display_name_falls_back_to_role() {
        assert_eq!(profile(Some("Ana"), Some("client")).display_name(), "Ana");
        assert_eq!(profile(None, Some("trainer")).display_name(), "Trainer");
        assert_eq!(profile(Some("  "), Some("client")).display_name(), "Client");
        assert_eq!(profile(None, Some("admin")).display_name(), "User");
    }

    #[test]
    fn roster_label_marks_missing_fields() {
        let mut p = profile(Some("Sam"), Some("client"));
        assert_eq!(p.roster_label(), "Sam (N/A)");
        p.email = Some("sam@example.com".to_owned());
        assert_eq!(p.roster_label(), "Sam (sam@example.com)");
    }
}

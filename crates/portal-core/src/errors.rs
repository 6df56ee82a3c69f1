// ABOUTME: Unified error type for configuration, auth, data-access and session failures
// ABOUTME: ErrorCode carries the HTTP mapping; AppError carries the user-facing message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! Error handling
//!
//! Every call into the auth gateway or the data store is converted into an
//! [`AppError`]. The [`ErrorCode`] groups failures the way the UI recovers
//! from them. Configuration errors halt startup and authentication errors
//! become form messages. Data-access errors degrade to empty results, while
//! invalid-state errors and lapsed sessions send the user back to sign-in.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required configuration value is absent
    ConfigMissing,
    /// A configuration value is present but unusable
    ConfigInvalid,
    /// Credentials were rejected by the auth gateway
    AuthInvalid,
    /// The session lapsed and the user must sign in again
    AuthRequired,
    /// User input failed validation
    InvalidInput,
    /// The hosted store or gateway failed or was unreachable
    ExternalServiceError,
    /// Authenticated session without a usable profile
    InvalidState,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error class
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::AuthInvalid | Self::AuthRequired => 401,
            Self::InvalidInput => 400,
            Self::ExternalServiceError => 502,
            Self::InvalidState => 409,
            Self::ConfigMissing | Self::ConfigInvalid | Self::InternalError => 500,
        }
    }

    /// Stable lowercase name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMissing => "config_missing",
            Self::ConfigInvalid => "config_invalid",
            Self::AuthInvalid => "auth_invalid",
            Self::AuthRequired => "auth_required",
            Self::InvalidInput => "invalid_input",
            Self::ExternalServiceError => "external_service_error",
            Self::InvalidState => "invalid_state",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error with a classification and a displayable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    /// Error classification
    pub code: ErrorCode,
    /// Message shown to the user
    pub message: String,
}

/// Result alias used throughout the portal
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing configuration value
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// Malformed configuration value
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Rejected credentials or provider-side auth failure
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Session can no longer be used
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Input validation failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Failure reported by (or while talking to) the hosted platform
    pub fn external_service(service: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::ExternalServiceError,
            if message.is_empty() {
                format!("{service} request failed")
            } else {
                message
            },
        )
    }

    /// Authenticated session in an unusable state
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Unexpected failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// True for errors that must halt startup
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConfigMissing | ErrorCode::ConfigInvalid
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {err}"))
    }
}

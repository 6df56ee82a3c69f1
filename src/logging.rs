// ABOUTME: Tracing subscriber initialization for the portal server and CLI
// ABOUTME: Env-filtered output in either human-readable or JSON line format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::environment::{LogFormat, LoggingConfig};
use crate::errors::{AppError, AppResult};

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns an error if the filter directive is malformed or a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    let directive = config.directive();
    let filter = EnvFilter::try_new(directive).map_err(|e| {
        AppError::config_invalid(format!("Invalid log filter '{directive}': {e}"))
    })?;

    let registry = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    result.map_err(|e| AppError::internal(format!("Failed to initialize logging: {e}")))
}

// ABOUTME: Reachability check of the hosted project using only the project key
// ABOUTME: Backs the check-connection CLI subcommand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use super::Services;
use crate::errors::AppResult;
use crate::store::{AccessToken, Query, Table};

/// Outcome of a successful connection check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    /// Profile rows visible to the project key
    pub visible_profiles: usize,
    /// Round-trip time of the query
    pub elapsed: Duration,
}

impl Services {
    /// Query `profiles` without a user session
    ///
    /// # Errors
    ///
    /// Returns the store error when the project is unreachable or rejects
    /// the key.
    #[instrument(skip(self))]
    pub async fn check_connection(&self) -> AppResult<ConnectionReport> {
        let started = Instant::now();
        let rows = self
            .store
            .select(&AccessToken::anonymous(), &Query::table(Table::Profiles))
            .await?;
        let report = ConnectionReport {
            visible_profiles: rows.len(),
            elapsed: started.elapsed(),
        };
        info!(
            visible_profiles = report.visible_profiles,
            elapsed_ms = report.elapsed.as_millis(),
            "Profiles table reachable"
        );
        Ok(report)
    }
}

// ABOUTME: Client roster for the assignment form
// ABOUTME: Every trainer sees every client profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

use tracing::{instrument, warn};

use super::{Listing, Services};
use crate::models::{Profile, Role};
use crate::session::SessionContext;
use crate::store::{fetch_rows, Query, Table};

impl Services {
    /// All profiles with the client role
    #[instrument(skip(self, context), fields(user_id = %context.user_id()))]
    pub async fn get_clients(&self, context: &SessionContext) -> Listing<Profile> {
        let query = Query::table(Table::Profiles).eq("role", Role::Client.as_str());
        match fetch_rows(self.store.as_ref(), &context.access_token, &query).await {
            Ok(rows) => Listing::ok(rows),
            Err(e) => {
                warn!(error = %e, "Client fetch failed");
                Listing::degraded(format!("Error fetching clients: {e}"))
            }
        }
    }
}

// SPDX-License-Identifier: MIT

//! Account connection model: a stored link between a user and one
//! external advertising platform account.

use serde::{Deserialize, Serialize};

/// A user's connection to one advertising platform account.
///
/// Token fields hold the values returned by the (simulated) OAuth
/// exchange; `expires_at` is advisory only and never enforced.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountConnection {
    pub id: i64,
    pub user_id: i64,
    pub platform: String,
    pub account_id: String,
    pub account_name: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Token expiry (RFC 3339), advisory only
    pub expires_at: Option<String>,
    /// 1 for active, 0 for inactive
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for creating a new connection row.
#[derive(Debug, Clone)]
pub struct NewConnection {
    pub user_id: i64,
    pub platform: String,
    pub account_id: String,
    pub account_name: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<String>,
}

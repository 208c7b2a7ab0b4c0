// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User identity record.
///
/// Created on first successful login; the `google_id` column is filled in
/// when an external identity gets linked to an email-matched record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub google_id: Option<String>,
    /// When the user first logged in (RFC 3339)
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for creating a new user row.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub google_id: Option<String>,
}

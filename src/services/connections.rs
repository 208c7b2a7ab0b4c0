// SPDX-License-Identifier: MIT

//! Account connection manager.
//!
//! "Connecting" a platform is a simulated OAuth exchange: token fields
//! are placeholder strings, never refreshed and never validated.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{AccountConnection, NewConnection, Platform};

/// Outcome of a connect call.
pub struct ConnectOutcome {
    pub connection: AccountConnection,
    /// False when an active connection already existed for this platform
    pub created: bool,
}

/// Connect a user to a platform account.
///
/// Idempotent short-circuit: an existing active (user, platform)
/// connection is returned unchanged rather than superseded.
pub async fn connect(
    store: &Store,
    user_id: i64,
    platform: Platform,
) -> Result<ConnectOutcome, AppError> {
    if let Some(existing) = store.find_active_connection(user_id, platform.as_str()).await? {
        tracing::debug!(
            user_id,
            platform = %platform,
            connection_id = existing.id,
            "Reusing existing platform connection"
        );
        return Ok(ConnectOutcome {
            connection: existing,
            created: false,
        });
    }

    let now = chrono::Utc::now();
    // Time-based suffix keeps generated account ids unique enough
    let account_id = format!("demo_{}_{}", platform.as_str(), now.timestamp_millis());

    let connection = store
        .create_connection(NewConnection {
            user_id,
            platform: platform.as_str().to_string(),
            account_id,
            account_name: format!("Demo {} Account", platform.config().name),
            access_token: Some(format!("mock_token_{}", platform.as_str())),
            refresh_token: Some(format!("mock_refresh_{}", platform.as_str())),
            expires_at: Some((now + chrono::Duration::hours(1)).to_rfc3339()),
        })
        .await?;

    Ok(ConnectOutcome {
        connection,
        created: true,
    })
}

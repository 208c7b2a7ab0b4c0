// SPDX-License-Identifier: MIT

//! Platform connection routes: simulated OAuth connect, connection
//! listing, and the mock platform-data diagnostic endpoint.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AccountConnection, Platform};
use crate::services::{connections, platform_data};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/{platform}", get(connect_platform))
        .route("/api/auth/{platform}/callback", get(connect_platform_callback))
        .route("/api/account-connections", get(list_connections))
        .route(
            "/api/platform-data/{platform}/{account_id}",
            get(get_platform_data),
        )
}

/// Response for a platform connect call.
#[derive(Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub connection: AccountConnection,
    pub message: String,
}

/// Connect the current user to an ad platform (simulated OAuth).
///
/// Idempotent: a second call for an already-connected platform returns
/// the existing connection.
async fn connect_platform(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
) -> Result<Json<ConnectResponse>> {
    let platform: Platform = platform.parse()?;

    tracing::info!(user_id = user.user_id, platform = %platform, "Connecting platform");

    let outcome = connections::connect(&state.store, user.user_id, platform).await?;

    let name = platform.config().name;
    let message = if outcome.created {
        format!("Successfully connected to {}", name)
    } else {
        format!("Already connected to {}", name)
    };

    Ok(Json(ConnectResponse {
        success: true,
        connection: outcome.connection,
        message,
    }))
}

#[derive(Deserialize)]
struct PlatformCallbackParams {
    #[serde(default)]
    error: Option<String>,
}

/// Simulated OAuth callback for a platform connection.
///
/// Redirects back to the UI with a query-string success or error signal.
async fn connect_platform_callback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
    Query(params): Query<PlatformCallbackParams>,
) -> Result<Redirect> {
    let frontend_url = &state.config.frontend_url;

    let platform: Platform = match platform.parse() {
        Ok(platform) => platform,
        Err(_) => {
            let redirect = format!("{}?error=unsupported_platform", frontend_url);
            return Ok(Redirect::temporary(&redirect));
        }
    };

    if let Some(error) = params.error {
        tracing::warn!(platform = %platform, error = %error, "Platform OAuth error");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect));
    }

    connections::connect(&state.store, user.user_id, platform).await?;

    let redirect = format!("{}?connected={}", frontend_url, platform.as_str());
    Ok(Redirect::temporary(&redirect))
}

#[derive(Deserialize)]
struct ConnectionsQuery {
    #[serde(default)]
    platform: Option<String>,
}

/// List the current user's connections, optionally filtered by platform.
async fn list_connections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ConnectionsQuery>,
) -> Result<Json<Vec<AccountConnection>>> {
    let platform = query
        .platform
        .as_deref()
        .map(str::parse::<Platform>)
        .transpose()?;

    let connections = state
        .store
        .list_connections(user.user_id, platform.map(|p| p.as_str()))
        .await?;

    Ok(Json(connections))
}

/// Return synthetic performance data for a connection (diagnostic/demo).
async fn get_platform_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((platform, account_id)): Path<(String, i64)>,
) -> Result<Json<serde_json::Value>> {
    let platform: Platform = platform.parse()?;

    let connection = state
        .store
        .get_connection(account_id)
        .await?
        .filter(|c| c.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound("Account connection not found".to_string()))?;

    Ok(Json(platform_data::mock_platform_data(
        platform,
        &connection.account_name,
    )))
}

// SPDX-License-Identifier: MIT

//! Audit routes: list, create (which kicks off background processing),
//! and ownership-checked deletion.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Audit, NewAudit, Platform, ReportFormat};
use crate::services::ProcessAuditJob;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/audits", get(list_audits))
        .route("/api/audits", post(create_audit))
        .route("/api/audits/{id}", delete(delete_audit))
}

/// List the current user's audits, newest first.
async fn list_audits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Audit>>> {
    let audits = state.store.list_audits(user.user_id).await?;
    Ok(Json(audits))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateAuditRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    name: String,
    platform: String,
    connection_id: i64,
    report_format: String,
}

/// Create an audit and enqueue its background processing.
///
/// Returns the row with status "processing"; callers poll the list
/// endpoint to observe the terminal state.
async fn create_audit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAuditRequest>,
) -> Result<Json<Audit>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let platform: Platform = request.platform.parse()?;
    let report_format: ReportFormat = request.report_format.parse()?;

    // Resolve and ownership-check the referenced connection
    let connection = state
        .store
        .get_connection(request.connection_id)
        .await?
        .filter(|c| c.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound("Account connection not found".to_string()))?;

    let audit = state
        .store
        .create_audit(NewAudit {
            name: request.name,
            platform: platform.as_str().to_string(),
            account_id: Some(connection.account_id),
            account_name: Some(connection.account_name.clone()),
            report_format: report_format.as_str().to_string(),
            created_by: user.user_id,
        })
        .await?;

    // Exactly one job per audit id, enqueued once at creation
    let job = ProcessAuditJob {
        audit_id: audit.id,
        user_id: user.user_id,
        platform,
        account_name: connection.account_name,
        report_format,
    };

    if let Err(e) = state.jobs.enqueue(job) {
        // Worker gone; the row would sit in "processing" forever
        tracing::error!(audit_id = audit.id, error = %e, "Failed to enqueue audit job");
        state.store.fail_audit(audit.id).await?;
        return Err(e);
    }

    Ok(Json(audit))
}

/// Response for audit deletion.
#[derive(Serialize)]
pub struct DeleteAuditResponse {
    pub success: bool,
}

/// Hard-delete an audit owned by the caller.
///
/// No cancellation signal reaches an in-flight background task; its
/// terminal update becomes a no-op.
async fn delete_audit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteAuditResponse>> {
    let deleted = state.store.delete_audit(id, user.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Audit not found".to_string()));
    }

    tracing::info!(audit_id = id, user_id = user.user_id, "Deleted audit");
    Ok(Json(DeleteAuditResponse { success: true }))
}

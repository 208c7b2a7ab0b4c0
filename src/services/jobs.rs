// SPDX-License-Identifier: MIT

//! Audit processing queue and worker.
//!
//! Audit creation enqueues exactly one job per audit id on an in-process
//! channel; a dedicated worker task drains it. The "processing" row in the
//! audits table is the durable reference to pending work: a startup
//! reconciliation sweep fails rows that outlived their worker (e.g. after
//! a process restart).
//!
//! Terminal status updates are conditional on the row still being in
//! "processing", so a user deleting an audit mid-flight turns the worker's
//! final write into a no-op instead of resurrecting the row. No step is
//! ever retried; the first failure fails the audit.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Platform, ReportFormat};
use crate::services::analysis::AnalysisClient;
use crate::services::platform_data::mock_platform_data;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Work item for one audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAuditJob {
    pub audit_id: i64,
    pub user_id: i64,
    pub platform: Platform,
    pub account_name: String,
    pub report_format: ReportFormat,
}

/// Handle for enqueuing audit jobs.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<ProcessAuditJob>,
}

impl JobQueue {
    /// Spawn the worker task and return the queue handle.
    pub fn start(store: Store, analysis: Arc<AnalysisClient>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProcessAuditJob>();

        tokio::spawn(async move {
            let processor = AuditProcessor { store, analysis };
            while let Some(job) = rx.recv().await {
                processor.process(job).await;
            }
            tracing::info!("Audit worker stopped");
        });

        Self { tx }
    }

    /// Enqueue a job. Fails only when the worker task is gone.
    pub fn enqueue(&self, job: ProcessAuditJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Audit worker unavailable")))
    }
}

/// Runs the audit workflow for one job:
/// fetch mock platform data, analyze, render the report, then flip the
/// audit row to its terminal status.
struct AuditProcessor {
    store: Store,
    analysis: Arc<AnalysisClient>,
}

impl AuditProcessor {
    async fn process(&self, job: ProcessAuditJob) {
        let audit_id = job.audit_id;
        tracing::info!(
            audit_id,
            platform = %job.platform,
            "Processing audit"
        );

        match self.run(&job).await {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(audit_id, error = %e, "Audit failed");
                match self.store.fail_audit(audit_id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        // Row deleted mid-flight; nothing to update
                        tracing::debug!(audit_id, "Audit gone before failure update");
                    }
                    Err(db_err) => {
                        tracing::error!(audit_id, error = %db_err, "Failed to mark audit failed");
                    }
                }
            }
        }
    }

    async fn run(&self, job: &ProcessAuditJob) -> Result<()> {
        let account_data = mock_platform_data(job.platform, &job.account_name);

        let analysis = self.analysis.analyze(job.platform, &account_data).await?;

        let report = self
            .analysis
            .render_report(&analysis, job.platform, &job.account_name, job.report_format)
            .await?;

        let report_url = format!(
            "/reports/audit-{}.{}",
            job.audit_id,
            job.report_format.extension()
        );
        let audit_data = serde_json::json!({
            "analysis": analysis,
            "report": report,
        })
        .to_string();

        let updated = self
            .store
            .complete_audit(job.audit_id, &report_url, &audit_data)
            .await?;

        if updated {
            tracing::info!(
                audit_id = job.audit_id,
                report_url = %report_url,
                score = analysis.score,
                "Audit completed"
            );
        } else {
            // Row deleted mid-flight, or already terminal
            tracing::debug!(audit_id = job.audit_id, "Audit gone before completion update");
        }

        Ok(())
    }
}

/// Fail audits stuck in "processing" past the configured timeout.
///
/// Called once at startup; a processing row older than the timeout has no
/// live worker behind it.
pub async fn reconcile_stuck_audits(store: &Store, timeout_minutes: i64) -> Result<u64> {
    let cutoff = (chrono::Utc::now() - chrono::Duration::minutes(timeout_minutes)).to_rfc3339();
    let failed = store.fail_stuck_audits(&cutoff).await?;
    if failed > 0 {
        tracing::warn!(failed, timeout_minutes, "Failed stuck audits at startup");
    }
    Ok(failed)
}

// SPDX-License-Identifier: MIT

//! Audit job model and its status/report-format vocabularies.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an audit job.
///
/// An audit starts as `Processing` and transitions exactly once to either
/// `Completed` or `Failed`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Processing,
    Completed,
    Failed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Processing => "processing",
            AuditStatus::Completed => "completed",
            AuditStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested output format for the generated report.
///
/// The format is advisory text in the completion prompt; no binary
/// artifact is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    Pdf,
    Powerpoint,
    GoogleSlides,
    GoogleDoc,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Powerpoint => "powerpoint",
            ReportFormat::GoogleSlides => "google-slides",
            ReportFormat::GoogleDoc => "google-doc",
        }
    }

    /// File extension used when building the report URL.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Powerpoint => "pptx",
            ReportFormat::GoogleSlides => "slides",
            ReportFormat::GoogleDoc => "doc",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ReportFormat::Pdf),
            "powerpoint" => Ok(ReportFormat::Powerpoint),
            "google-slides" => Ok(ReportFormat::GoogleSlides),
            "google-doc" => Ok(ReportFormat::GoogleDoc),
            other => Err(AppError::BadRequest(format!(
                "Invalid report format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested analysis job tied to one account connection.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: i64,
    pub name: String,
    pub platform: String,
    /// "processing", "completed" or "failed"
    pub status: String,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub report_format: String,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Set when the audit reaches a terminal state
    pub completed_at: Option<String>,
    /// Report artifact reference, set only on completion
    pub report_url: Option<String>,
    /// Serialized analysis results and report text (JSON)
    pub audit_data: Option<String>,
}

/// Fields for creating a new audit row (status starts as "processing").
#[derive(Debug, Clone)]
pub struct NewAudit {
    pub name: String,
    pub platform: String,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub report_format: String,
    pub created_by: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_format_round_trips_through_str() {
        for format in [
            ReportFormat::Pdf,
            ReportFormat::Powerpoint,
            ReportFormat::GoogleSlides,
            ReportFormat::GoogleDoc,
        ] {
            assert_eq!(format.as_str().parse::<ReportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn invalid_report_format_is_rejected() {
        assert!("word".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn report_extensions() {
        assert_eq!(ReportFormat::Pdf.extension(), "pdf");
        assert_eq!(ReportFormat::Powerpoint.extension(), "pptx");
        assert_eq!(ReportFormat::GoogleSlides.extension(), "slides");
        assert_eq!(ReportFormat::GoogleDoc.extension(), "doc");
    }
}

// SPDX-License-Identifier: MIT

//! Ad Account Auditor backend.
//!
//! Lets users connect simulated advertising-platform accounts, request
//! audits of their performance data, and read the generated reports.
//! Audit analysis is delegated to an external completion API; platform
//! data itself is synthetic.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{AnalysisClient, JobQueue};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub analysis: Arc<AnalysisClient>,
    pub jobs: JobQueue,
}

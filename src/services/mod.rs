// SPDX-License-Identifier: MIT

//! Service layer: analysis client, connection manager, mock platform
//! data, and the audit job queue.

pub mod analysis;
pub mod connections;
pub mod jobs;
pub mod platform_data;

pub use analysis::{AnalysisClient, AnalysisResult};
pub use jobs::{JobQueue, ProcessAuditJob};

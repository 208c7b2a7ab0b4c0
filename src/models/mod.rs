// SPDX-License-Identifier: MIT

//! Data models shared between storage and the API.

pub mod audit;
pub mod connection;
pub mod platform;
pub mod user;

pub use audit::{Audit, AuditStatus, NewAudit, ReportFormat};
pub use connection::{AccountConnection, NewConnection};
pub use platform::{Platform, PlatformConfig};
pub use user::{NewUser, User};

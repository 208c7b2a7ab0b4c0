// SPDX-License-Identifier: MIT

//! Relational store with typed CRUD operations.
//!
//! Wraps a SQLite pool and provides high-level operations for:
//! - Users (identity records)
//! - Account connections (platform links with mock credential material)
//! - Audits (analysis jobs with a processing/completed/failed lifecycle)

use crate::error::AppError;
use crate::models::{AccountConnection, Audit, NewAudit, NewConnection, NewUser, User};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    first_name TEXT,
    last_name TEXT,
    profile_image_url TEXT,
    google_id TEXT UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS account_connections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    platform TEXT NOT NULL,
    account_id TEXT NOT NULL,
    account_name TEXT NOT NULL,
    access_token TEXT,
    refresh_token TEXT,
    expires_at TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    platform TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'processing',
    account_id TEXT,
    account_name TEXT,
    report_format TEXT NOT NULL,
    created_by INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    completed_at TEXT,
    report_url TEXT,
    audit_data TEXT
);

CREATE INDEX IF NOT EXISTS idx_audits_created_by ON audits(created_by);
CREATE INDEX IF NOT EXISTS idx_connections_user ON account_connections(user_id);
"#;

/// Database client.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Store {
    /// Open a connection pool and create the schema if missing.
    ///
    /// In-memory databases are pinned to a single pooled connection so the
    /// data survives across requests.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            pool_options = pool_options.max_connections(5);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!(url, "Database ready");

        Ok(Self { pool })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their external Google identity.
    pub async fn get_user_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = ?")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Create a user row.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let now = now_rfc3339();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, profile_image_url, google_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.profile_image_url)
        .bind(&new_user.google_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    /// Link a Google identity to an existing email-matched user.
    pub async fn link_google_identity(
        &self,
        user_id: i64,
        google_id: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET google_id = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(google_id)
        .bind(now_rfc3339())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    // ─── Audit Operations ────────────────────────────────────────

    /// List a user's audits, newest first.
    pub async fn list_audits(&self, user_id: i64) -> Result<Vec<Audit>, AppError> {
        let audits = sqlx::query_as::<_, Audit>(
            "SELECT * FROM audits WHERE created_by = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(audits)
    }

    /// Get an audit by id.
    pub async fn get_audit(&self, id: i64) -> Result<Option<Audit>, AppError> {
        let audit = sqlx::query_as::<_, Audit>("SELECT * FROM audits WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(audit)
    }

    /// Insert an audit row with status "processing".
    pub async fn create_audit(&self, new_audit: NewAudit) -> Result<Audit, AppError> {
        let now = now_rfc3339();
        let audit = sqlx::query_as::<_, Audit>(
            r#"
            INSERT INTO audits (name, platform, status, account_id, account_name, report_format, created_by, created_at, updated_at)
            VALUES (?, ?, 'processing', ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new_audit.name)
        .bind(&new_audit.platform)
        .bind(&new_audit.account_id)
        .bind(&new_audit.account_name)
        .bind(&new_audit.report_format)
        .bind(new_audit.created_by)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(audit_id = audit.id, name = %audit.name, "Created audit");
        Ok(audit)
    }

    /// Transition an audit to "completed".
    ///
    /// Conditional on the row still being in "processing" so a concurrent
    /// delete or a duplicate worker cannot resurrect a terminal row.
    /// Returns false when no row was updated.
    pub async fn complete_audit(
        &self,
        id: i64,
        report_url: &str,
        audit_data: &str,
    ) -> Result<bool, AppError> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE audits
            SET status = 'completed', completed_at = ?, updated_at = ?, report_url = ?, audit_data = ?
            WHERE id = ? AND status = 'processing'
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(report_url)
        .bind(audit_data)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition an audit to "failed". Same conditional rules as
    /// [`Store::complete_audit`]; the report URL stays unset.
    pub async fn fail_audit(&self, id: i64) -> Result<bool, AppError> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE audits
            SET status = 'failed', completed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'processing'
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ownership-checked hard delete. Returns false when the row does not
    /// exist or belongs to a different user.
    pub async fn delete_audit(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM audits WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fail audits stuck in "processing" since before `cutoff` (RFC 3339).
    ///
    /// Run once at startup so a process restart cannot silently orphan
    /// in-flight jobs. Returns the number of audits failed.
    pub async fn fail_stuck_audits(&self, cutoff: &str) -> Result<u64, AppError> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE audits
            SET status = 'failed', completed_at = ?, updated_at = ?
            WHERE status = 'processing' AND created_at < ?
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ─── Account Connection Operations ───────────────────────────

    /// List a user's connections, optionally filtered by platform.
    pub async fn list_connections(
        &self,
        user_id: i64,
        platform: Option<&str>,
    ) -> Result<Vec<AccountConnection>, AppError> {
        let connections = match platform {
            Some(platform) => {
                sqlx::query_as::<_, AccountConnection>(
                    "SELECT * FROM account_connections WHERE user_id = ? AND platform = ? ORDER BY id",
                )
                .bind(user_id)
                .bind(platform)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AccountConnection>(
                    "SELECT * FROM account_connections WHERE user_id = ? ORDER BY id",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(connections)
    }

    /// Get a connection by id.
    pub async fn get_connection(&self, id: i64) -> Result<Option<AccountConnection>, AppError> {
        let connection =
            sqlx::query_as::<_, AccountConnection>("SELECT * FROM account_connections WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(connection)
    }

    /// Find the active connection for (user, platform), if any.
    pub async fn find_active_connection(
        &self,
        user_id: i64,
        platform: &str,
    ) -> Result<Option<AccountConnection>, AppError> {
        let connection = sqlx::query_as::<_, AccountConnection>(
            r#"
            SELECT * FROM account_connections
            WHERE user_id = ? AND platform = ? AND is_active = 1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(platform)
        .fetch_optional(&self.pool)
        .await?;
        Ok(connection)
    }

    /// Insert a connection row (active by default).
    pub async fn create_connection(
        &self,
        new_connection: NewConnection,
    ) -> Result<AccountConnection, AppError> {
        let now = now_rfc3339();
        let connection = sqlx::query_as::<_, AccountConnection>(
            r#"
            INSERT INTO account_connections
                (user_id, platform, account_id, account_name, access_token, refresh_token, expires_at, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_connection.user_id)
        .bind(&new_connection.platform)
        .bind(&new_connection.account_id)
        .bind(&new_connection.account_name)
        .bind(&new_connection.access_token)
        .bind(&new_connection.refresh_token)
        .bind(&new_connection.expires_at)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            connection_id = connection.id,
            platform = %connection.platform,
            "Created account connection"
        );
        Ok(connection)
    }
}

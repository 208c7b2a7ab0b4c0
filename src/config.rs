// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Optional credentials (Google OAuth, completion API key) disable their
//! feature path when absent instead of failing startup.

use std::env;

/// Session lifetime: one week.
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Fixed test-login credentials (demo environments only).
pub const TEST_LOGIN_EMAIL: &str = "test@example.com";
pub const TEST_LOGIN_PASSWORD: &str = "testpass123";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection string (sqlite URL)
    pub database_url: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Session token signing key
    pub session_secret: Vec<u8>,
    /// Google OAuth client ID (login disabled when None)
    pub google_client_id: Option<String>,
    /// Google OAuth client secret
    pub google_client_secret: Option<String>,
    /// Completion API key (audit analysis fails without it)
    pub openai_api_key: Option<String>,
    /// Completion API base URL (override for local testing)
    pub openai_base_url: String,
    /// Audits stuck in "processing" longer than this are failed at startup
    pub stuck_audit_timeout_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_secret: env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
                .into_bytes(),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            stuck_audit_timeout_minutes: env::var("STUCK_AUDIT_TIMEOUT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            session_secret: b"test_session_key_32_bytes_min!!!".to_vec(),
            google_client_id: None,
            google_client_secret: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            stuck_audit_timeout_minutes: 30,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_optional_credentials() {
        let config = Config::test_default();

        assert!(config.google_client_id.is_none());
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite::memory:");
    }
}

// SPDX-License-Identifier: MIT

//! Login routes: test-login, Google OAuth, logout, current user.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{TEST_LOGIN_EMAIL, TEST_LOGIN_PASSWORD};
use crate::error::{AppError, Result};
use crate::middleware::auth::{authenticate, create_session_token, SESSION_COOKIE};
use crate::models::{NewUser, User};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/user", get(current_user))
        .route("/api/auth/test-login", post(test_login))
        .route("/api/auth/google", get(google_auth_start))
        .route("/api/auth/google/callback", get(google_auth_callback))
        .route("/api/auth/logout", get(logout))
}

/// Get the current user, or `null` for anonymous callers.
async fn current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<Option<User>>> {
    let user = match authenticate(&state, &jar, &headers) {
        Some(user_id) => state.store.get_user(user_id).await?,
        None => None,
    };
    Ok(Json(user))
}

#[derive(Deserialize)]
struct TestLoginRequest {
    email: String,
    password: String,
}

/// Log in with the fixed test credential pair.
///
/// Creates the canned test user on first use and establishes a session.
async fn test_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<TestLoginRequest>,
) -> Result<(CookieJar, Json<User>)> {
    if request.email != TEST_LOGIN_EMAIL || request.password != TEST_LOGIN_PASSWORD {
        return Err(AppError::Unauthorized);
    }

    let user = match state.store.get_user_by_email(TEST_LOGIN_EMAIL).await? {
        Some(user) => user,
        None => {
            state
                .store
                .create_user(NewUser {
                    email: TEST_LOGIN_EMAIL.to_string(),
                    first_name: Some("Test".to_string()),
                    last_name: Some("User".to_string()),
                    ..NewUser::default()
                })
                .await?
        }
    };

    let token = create_session_token(user.id, &state.config.session_secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, "Test login");

    let cookie = session_cookie(token);
    Ok((jar.add(cookie), Json(user)))
}

/// Log out by clearing the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (
        jar,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

// ─── Google OAuth ────────────────────────────────────────────

/// Start the Google login flow.
///
/// Returns a setup-required error when no Google OAuth credentials are
/// configured; the rest of the app keeps working without them.
async fn google_auth_start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let client_id = state
        .config
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::SetupRequired("Google OAuth credentials".to_string()))?;

    let oauth_state = sign_state(&state.config.frontend_url, &state.config.session_secret)?;
    let callback_url = format!("{}/api/auth/google/callback", request_origin(&headers));

    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope=openid%20email%20profile&\
         state={}",
        client_id,
        urlencoding::encode(&callback_url),
        oauth_state
    );

    tracing::info!("Starting Google OAuth flow");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
struct GoogleCallbackParams {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// Google OAuth callback: exchange the code, find or create the user,
/// set the session cookie, and bounce back to the frontend with a
/// success or error query signal.
async fn google_auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<GoogleCallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let frontend_url = verify_state(&params.state, &state.config.session_secret)
        .unwrap_or_else(|| {
            tracing::warn!("Invalid or tampered OAuth state, falling back to default frontend URL");
            state.config.frontend_url.clone()
        });

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::OAuth("Missing authorization code".to_string()))?;

    let callback_url = format!("{}/api/auth/google/callback", request_origin(&headers));
    let profile = match exchange_google_code(&state, &code, &callback_url).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Google token exchange failed");
            let redirect = format!("{}?error=auth_failed", frontend_url);
            return Ok((jar, Redirect::temporary(&redirect)));
        }
    };

    let user = find_or_create_google_user(&state, profile).await?;

    let token = create_session_token(user.id, &state.config.session_secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, "Google login");

    let redirect = format!("{}?login=success", frontend_url);
    Ok((jar.add(session_cookie(token)), Redirect::temporary(&redirect)))
}

/// Look up the user by Google id, then by email (linking the Google
/// identity to an existing record), then create a fresh row.
async fn find_or_create_google_user(state: &AppState, profile: GoogleProfile) -> Result<User> {
    if let Some(user) = state.store.get_user_by_google_id(&profile.id).await? {
        return Ok(user);
    }

    if let Some(existing) = state.store.get_user_by_email(&profile.email).await? {
        return state.store.link_google_identity(existing.id, &profile.id).await;
    }

    state
        .store
        .create_user(NewUser {
            email: profile.email,
            first_name: profile.given_name,
            last_name: profile.family_name,
            profile_image_url: profile.picture,
            google_id: Some(profile.id),
        })
        .await
}

#[derive(Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Google userinfo payload (subset).
#[derive(Deserialize)]
struct GoogleProfile {
    id: String,
    email: String,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Exchange an authorization code for the user's Google profile.
async fn exchange_google_code(
    state: &AppState,
    code: &str,
    redirect_uri: &str,
) -> Result<GoogleProfile> {
    let client_id = state
        .config
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::SetupRequired("Google OAuth credentials".to_string()))?;
    let client_secret = state
        .config
        .google_client_secret
        .as_deref()
        .ok_or_else(|| AppError::SetupRequired("Google OAuth credentials".to_string()))?;

    let http = reqwest::Client::new();

    let response = http
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| AppError::OAuth(format!("Token exchange request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::OAuth(format!(
            "Token exchange failed with status {}: {}",
            status, body
        )));
    }

    let tokens: GoogleTokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::OAuth(format!("Failed to parse token response: {}", e)))?;

    let profile = http
        .get("https://www.googleapis.com/oauth2/v2/userinfo")
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .map_err(|e| AppError::OAuth(format!("Userinfo request failed: {}", e)))?
        .json()
        .await
        .map_err(|e| AppError::OAuth(format!("Failed to parse userinfo: {}", e)))?;

    Ok(profile)
}

/// Derive the externally visible origin of this request.
fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}", scheme, host)
}

// ─── OAuth state signing ─────────────────────────────────────

/// Build an HMAC-signed OAuth state value carrying the frontend URL.
fn sign_state(frontend_url: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    // Payload format: "frontend_url|timestamp_hex"
    let payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let signed = format!("{}|{}", payload, signature);
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the signature and recover the frontend URL from an OAuth state
/// value. Returns None on any mismatch or malformation.
fn verify_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = format!("{}|{}", parts[0], parts[1]);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if parts[2] != expected {
        tracing::error!("OAuth state signature mismatch");
        return None;
    }

    Some(parts[0].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_state_round_trips() {
        let secret = b"secret_key";
        let state = sign_state("https://example.com", secret).unwrap();
        assert_eq!(
            verify_state(&state, secret),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn tampered_state_is_rejected() {
        let secret = b"secret_key";
        let state = sign_state("https://example.com", secret).unwrap();

        let mut decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&state).unwrap()).unwrap();
        decoded = decoded.replacen("example.com", "evil.com", 1);
        let tampered = URL_SAFE_NO_PAD.encode(decoded.as_bytes());

        assert_eq!(verify_state(&tampered, secret), None);
    }

    #[test]
    fn state_with_wrong_secret_is_rejected() {
        let state = sign_state("https://example.com", b"secret_key").unwrap();
        assert_eq!(verify_state(&state, b"wrong_key"), None);
    }

    #[test]
    fn malformed_state_is_rejected() {
        let secret = b"secret_key";
        assert_eq!(verify_state("not-base64!!", secret), None);

        let malformed = URL_SAFE_NO_PAD.encode(b"only|two");
        assert_eq!(verify_state(&malformed, secret), None);
    }
}

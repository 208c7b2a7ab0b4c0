// SPDX-License-Identifier: MIT

//! Session token middleware.
//!
//! Sessions are stateless JWTs carried in the `adaudit_token` cookie or an
//! `Authorization: Bearer` header. Authenticated handlers receive an
//! [`AuthUser`] request extension instead of reading ambient session state.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "adaudit_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id =
        authenticate(&state, &jar, request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

/// Resolve the caller's user id from cookie or header, if any.
///
/// Used directly by `GET /api/auth/user`, which must answer `null` rather
/// than 401 for anonymous callers.
pub fn authenticate(state: &AppState, jar: &CookieJar, headers: &HeaderMap) -> Option<i64> {
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())?;
        auth_header.strip_prefix("Bearer ")?.to_string()
    };

    decode_user_id(&token, &state.config.session_secret)
}

/// Validate a session token and extract the user id.
pub fn decode_user_id(token: &str, signing_key: &[u8]) -> Option<i64> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    token_data.claims.sub.parse().ok()
}

/// Create a session JWT for a user.
pub fn create_session_token(user_id: i64, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + crate::config::SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_round_trip() {
        let key = b"test_session_key_32_bytes_min!!!";
        let token = create_session_token(42, key).unwrap();
        assert_eq!(decode_user_id(&token, key), Some(42));
    }

    #[test]
    fn session_token_rejects_wrong_key() {
        let token = create_session_token(42, b"one_signing_key_32_bytes_long!!!").unwrap();
        assert_eq!(
            decode_user_id(&token, b"other_signing_key_32_bytes_long!"),
            None
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(decode_user_id("not.a.jwt", b"key"), None);
    }
}

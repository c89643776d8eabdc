//! Signed session tokens and the cookies that carry them.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

pub const SESSION_COOKIE: &str = "session_token";

/// Claims embedded in every session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject: the account email
    pub sub: String,
    pub name: String,
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 keys for issuing and verifying session tokens
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, email: &str, name: &str, picture: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: email.to_string(),
            name: name.to_string(),
            picture: picture.map(str::to_string),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenInvalid(format!("encode: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

/// Session token from an `Authorization: Bearer` header, else from the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string());

    bearer.or_else(|| cookie_value(headers, SESSION_COOKIE))
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a cookie scoped to the whole site
pub fn set_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issued_token_verifies() {
        let keys = SessionKeys::new("test-secret", 3600);
        let token = keys.issue("jo@example.com", "Jo", None).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "jo@example.com");
        assert_eq!(claims.name, "Jo");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = SessionKeys::new("one", 3600).issue("jo@example.com", "Jo", None).unwrap();
        let err = SessionKeys::new("two", 3600).verify(&token).unwrap_err();

        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::new("secret", 0);
        let claims = SessionClaims {
            sub: "jo@example.com".to_string(),
            name: "Jo".to_string(),
            picture: None,
            iat: 1_000,
            exp: 2_000,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session_token=abc.def; lang=en"));

        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "lang").as_deref(), Some("en"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session_token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn secure_flag_only_when_requested() {
        assert!(set_cookie("a", "b", 10, true).ends_with("; Secure"));
        assert!(!set_cookie("a", "b", 10, false).contains("Secure"));
        assert!(clear_cookie("a").contains("Max-Age=0"));
    }
}

// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator sessions for the gateway.
//!
//! A session token is `{username}.{expires_unix}.{hex hmac}`, signed with
//! the session secret. It is accepted from `Authorization: Bearer <token>`
//! or from the `wacast_session` cookie set at login.
//!
//! When no operator password is configured, logins and all protected
//! requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "wacast_session";

/// Session signing and credential checking.
#[derive(Clone)]
pub struct AuthConfig {
    username: String,
    password: Option<String>,
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    /// Build from the `[auth]` config section. Without an explicit session
    /// secret, one is derived from the password.
    pub fn from_config(config: &wacast_config::model::AuthConfig) -> Self {
        let password = config.password.clone().filter(|p| !p.is_empty());
        let secret = match (&config.session_secret, &password) {
            (Some(secret), _) if !secret.is_empty() => secret.as_bytes().to_vec(),
            (_, Some(password)) => {
                let mut hasher = Sha256::new();
                hasher.update(b"wacast-session:");
                hasher.update(password.as_bytes());
                hasher.finalize().to_vec()
            }
            _ => Vec::new(),
        };
        Self {
            username: config.username.clone(),
            password,
            secret,
            ttl_secs: i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// True when logins are possible at all.
    pub fn enabled(&self) -> bool {
        self.password.is_some() && !self.secret.is_empty()
    }

    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        match &self.password {
            Some(expected) => self.enabled() && username == self.username && password == expected,
            None => false,
        }
    }

    fn sign(&self, payload: &str) -> Option<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        Some(mac)
    }

    /// Issue a token for the configured operator. Returns the token and its
    /// expiry as unix seconds.
    pub fn issue(&self, now_unix: i64) -> Option<(String, i64)> {
        if !self.enabled() {
            return None;
        }
        let expires_at = now_unix.saturating_add(self.ttl_secs);
        let payload = format!("{}.{expires_at}", self.username);
        let signature = hex::encode(self.sign(&payload)?.finalize().into_bytes());
        Some((format!("{payload}.{signature}"), expires_at))
    }

    /// Validate a token's signature, subject, and expiry.
    pub fn verify(&self, token: &str, now_unix: i64) -> bool {
        if !self.enabled() {
            return false;
        }
        let mut parts = token.rsplitn(3, '.');
        let (Some(signature), Some(expires), Some(username)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let Ok(expires_at) = expires.parse::<i64>() else {
            return false;
        };
        if username != self.username || expires_at <= now_unix {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.sign(&format!("{username}.{expires}"))
            .is_some_and(|mac| mac.verify_slice(&signature).is_ok())
    }

    /// `Set-Cookie` value for a fresh session.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl_secs
        )
    }

    /// `Set-Cookie` value that clears the session.
    pub fn clear_cookie() -> String {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Extract a session token from the bearer header or the session cookie.
fn request_token(request: &Request) -> Option<&str> {
    let headers = request.headers();
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// Middleware that admits requests carrying a valid session token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !auth.enabled() {
        tracing::error!("gateway has no operator password configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let now = chrono::Utc::now().timestamp();
    match request_token(&request) {
        Some(token) if auth.verify(token, now) => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(password: Option<&str>, secret: Option<&str>) -> AuthConfig {
        AuthConfig::from_config(&wacast_config::model::AuthConfig {
            username: "admin".into(),
            password: password.map(str::to_string),
            session_secret: secret.map(str::to_string),
            session_ttl_secs: 3600,
        })
    }

    #[test]
    fn no_password_fails_closed() {
        let auth = config(None, Some("secret"));
        assert!(!auth.enabled());
        assert!(!auth.check_credentials("admin", ""));
        assert!(auth.issue(1_000).is_none());
        assert!(!auth.verify("admin.99999999999.00", 1_000));
    }

    #[test]
    fn credentials_must_match() {
        let auth = config(Some("1234"), None);
        assert!(auth.check_credentials("admin", "1234"));
        assert!(!auth.check_credentials("admin", "12345"));
        assert!(!auth.check_credentials("root", "1234"));
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let auth = config(Some("1234"), None);
        let (token, expires_at) = auth.issue(1_000).unwrap();
        assert_eq!(expires_at, 4_600);
        assert!(token.starts_with("admin.4600."));
        assert!(auth.verify(&token, 1_001));
        assert!(!auth.verify(&token, 4_600));
    }

    #[test]
    fn tampered_or_foreign_tokens_fail() {
        let auth = config(Some("1234"), None);
        let (token, _) = auth.issue(1_000).unwrap();

        let extended = token.replacen("4600", "9600", 1);
        assert!(!auth.verify(&extended, 1_001));

        let other = config(Some("different"), None);
        assert!(!other.verify(&token, 1_001));

        assert!(!auth.verify("garbage", 1_001));
        assert!(!auth.verify("admin.4600.zz", 1_001));
    }

    #[test]
    fn explicit_secret_survives_password_change() {
        let before = config(Some("old"), Some("stable-secret"));
        let after = config(Some("new"), Some("stable-secret"));
        let (token, _) = before.issue(1_000).unwrap();
        assert!(after.verify(&token, 1_001));
    }

    #[test]
    fn cookie_and_bearer_extraction() {
        let auth = config(Some("1234"), None);
        let (token, _) = auth.issue(1_000).unwrap();

        let req = Request::builder()
            .header("cookie", format!("theme=dark; {SESSION_COOKIE}={token}"))
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&req), Some(token.as_str()));

        let req = Request::builder()
            .header("authorization", format!("Bearer {token}"))
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_token(&req), Some(token.as_str()));

        let req = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(request_token(&req), None);
    }

    #[test]
    fn debug_redacts_password() {
        let debug_output = format!("{:?}", config(Some("hunter2"), None));
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("[redacted]"));
    }
}

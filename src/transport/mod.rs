//! Credential-bearing HTTP pipeline.
//!
//! [`SecureClient`] runs every request through registered request hooks (credential
//! injection) and every response through response hooks (teardown on 401/403).
//! [`PublicClient`] is the pre-login client used for credential issuance.

mod interceptors;
mod public;
mod secure;

pub use interceptors::{HookId, Interceptors, RequestHook, ResponseHook};
pub use public::PublicClient;
pub use secure::{Attachment, CredentialInjector, SecureClient, SessionTeardown};

use std::fmt;
use std::str::FromStr;

use reqwest::header::HeaderValue;
use reqwest::StatusCode;

use crate::error::{AuthError, AuthResult};
use crate::identity::Credential;

/// How the credential is rendered into the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: <token>`
    Raw,
    /// `Authorization: Bearer <token>`
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, credential: &Credential) -> AuthResult<HeaderValue> {
        let s = match self {
            AuthScheme::Raw => credential.as_str().to_string(),
            AuthScheme::Bearer => format!("Bearer {}", credential.as_str()),
        };
        let mut v = HeaderValue::from_str(&s)
            .map_err(|_| AuthError::malformed("credential contains characters not allowed in a header"))?;
        v.set_sensitive(true);
        Ok(v)
    }
}

impl FromStr for AuthScheme {
    type Err = AuthError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(AuthScheme::Raw),
            "bearer" => Ok(AuthScheme::Bearer),
            other => Err(AuthError::config(format!("unknown auth scheme '{}' (expected raw|bearer)", other))),
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { AuthScheme::Raw => "raw", AuthScheme::Bearer => "bearer" })
    }
}

pub fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Pull a human readable reason out of an error body: `message`, then `error`,
/// then the raw text, then `default`.
pub(crate) fn failure_message(body: &str, default: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
                if !s.trim().is_empty() { return s.to_string(); }
            }
        }
        return default.to_string();
    }
    let t = body.trim();
    if t.is_empty() { default.to_string() } else { t.chars().take(200).collect() }
}

/// Consume a non-success response into the matching error.
pub(crate) async fn error_from_response(resp: reqwest::Response, default: &str) -> AuthError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = failure_message(&body, default);
    if is_authorization_failure(status) {
        AuthError::AuthorizationFailure { status: status.as_u16(), message }
    } else {
        AuthError::network(Some(status.as_u16()), message)
    }
}

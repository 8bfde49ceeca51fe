//! Unified error model for the session layer.
//! One enum covers input validation, credential problems, transport failures and
//! local persistence, so workflows, transports and the session manager can share
//! a single `AuthResult`.

use thiserror::Error;

/// Default user-visible reason when the server does not provide one.
pub const DEFAULT_LOGIN_FAILURE: &str = "Login failed. Please try again.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Bad input caught before any network call.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("malformed credential: {0}")]
    MalformedCredential(String),
    #[error("credential expired at {expires_at}")]
    ExpiredCredential { expires_at: i64 },
    #[error("role '{role}' is not permitted to hold a session")]
    UnauthorizedRole { role: String },
    /// HTTP 401/403 on a call. When the secure client's hooks are attached, the
    /// session has already been torn down by the time this is returned.
    #[error("authorization failure (HTTP {status}): {message}")]
    AuthorizationFailure { status: u16, message: String },
    #[error("request failed{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    NetworkOrServer { status: Option<u16>, message: String },
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuthError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::MalformedCredential(_) => "malformed_credential",
            AuthError::ExpiredCredential { .. } => "expired_credential",
            AuthError::UnauthorizedRole { .. } => "unauthorized_role",
            AuthError::AuthorizationFailure { .. } => "authorization_failure",
            AuthError::NetworkOrServer { .. } => "network_or_server_error",
            AuthError::Storage(_) => "storage_error",
            AuthError::Config(_) => "config_error",
        }
    }

    /// True for errors whose handling tears the session down.
    pub fn forces_logout(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedCredential(_)
                | AuthError::ExpiredCredential { .. }
                | AuthError::UnauthorizedRole { .. }
                | AuthError::AuthorizationFailure { .. }
        )
    }

    /// HTTP status attached to the failure, if the server produced one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AuthError::AuthorizationFailure { status, .. } => Some(*status),
            AuthError::NetworkOrServer { status, .. } => *status,
            _ => None,
        }
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self { AuthError::Validation(msg.into()) }
    pub fn malformed<S: Into<String>>(msg: S) -> Self { AuthError::MalformedCredential(msg.into()) }
    pub fn storage<S: Into<String>>(msg: S) -> Self { AuthError::Storage(msg.into()) }
    pub fn config<S: Into<String>>(msg: S) -> Self { AuthError::Config(msg.into()) }
    pub fn network<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        AuthError::NetworkOrServer { status, message: msg.into() }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::NetworkOrServer { status: err.status().map(|s| s.as_u16()), message: err.to_string() }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self { AuthError::Storage(err.to_string()) }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self { AuthError::Storage(err.to_string()) }
}

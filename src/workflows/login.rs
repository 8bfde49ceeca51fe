use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::LOGIN_PATH;
use crate::error::{AuthError, AuthResult, DEFAULT_LOGIN_FAILURE};
use crate::identity::{self, Credential, SessionManager, UserRecord};
use crate::routing::{NavMode, Navigator, DASHBOARD_PATH};
use crate::transport::PublicClient;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Reject empty fields and malformed addresses before anything touches the network.
    pub fn validate(&self) -> AuthResult<()> {
        let email = self.email.trim();
        if email.is_empty() { return Err(AuthError::validation("email is required")); }
        if self.password.is_empty() { return Err(AuthError::validation("password is required")); }
        if !EMAIL_RE.is_match(email) {
            return Err(AuthError::validation(format!("'{}' is not a valid email address", email)));
        }
        Ok(())
    }
}

/// Issuance endpoint envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
    pub data: Option<LoginData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: Option<String>,
}

pub struct LoginWorkflow {
    client: PublicClient,
    session: Arc<SessionManager>,
    nav: Arc<dyn Navigator>,
}

impl LoginWorkflow {
    pub fn new(client: PublicClient, session: Arc<SessionManager>, nav: Arc<dyn Navigator>) -> Self {
        Self { client, session, nav }
    }

    /// Exchange email/password for a credential and establish the session.
    /// Network and decode failures leave the session untouched.
    pub async fn run(&self, req: &LoginRequest) -> AuthResult<UserRecord> {
        req.validate()?;
        let body = LoginRequest::new(req.email.trim(), req.password.clone());
        let resp = self.client.post_json(LOGIN_PATH, &body, DEFAULT_LOGIN_FAILURE).await.map_err(|e| {
            error!(error = %e, "login error");
            e
        })?;
        let envelope: LoginEnvelope = resp.json().await
            .map_err(|e| AuthError::network(None, format!("unexpected login response: {}", e)))?;
        let token = envelope.data.and_then(|d| d.access_token).filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                let msg = if envelope.message.is_empty() { DEFAULT_LOGIN_FAILURE.to_string() } else { envelope.message.clone() };
                AuthError::network(Some(envelope.status_code).filter(|s| *s != 0), msg)
            })?;

        let credential = Credential::new(token);
        let claims = identity::decode(&credential).map_err(|e| {
            error!(error = %e, "failed to decode issued credential");
            e
        })?;
        let user = UserRecord::from_claims(&claims);
        self.session.login(user.clone(), credential)?;

        info!(user_id = %user.id, success = envelope.success, "login complete");
        self.nav.navigate(DASHBOARD_PATH, NavMode::Replace);
        Ok(user)
    }
}

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Method, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::identity::SessionManager;
use super::{failure_message, is_authorization_failure};

/// Pre-login client: no credential injection and no navigation. A 401/403 logs
/// the session out (memory, slots and cookie together) without navigating.
#[derive(Clone)]
pub struct PublicClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionManager>,
}

impl PublicClient {
    pub fn new(config: ClientConfig, jar: Arc<Jar>, session: Arc<SessionManager>) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config, session })
    }

    pub fn config(&self) -> &ClientConfig { &self.config }

    /// POST a JSON body. Every non-2xx status becomes `NetworkOrServer` carrying the
    /// server's `message` or `default_failure`.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B, default_failure: &str) -> AuthResult<Response> {
        let url = self.config.endpoint(path)?;
        let resp = self.http.request(Method::POST, url.clone()).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            debug!(%url, status = status.as_u16(), "ok");
            return Ok(resp);
        }
        if is_authorization_failure(status) {
            warn!(%url, status = status.as_u16(), "issuance refused; ending any existing session");
            self.session.logout();
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AuthError::network(Some(status.as_u16()), failure_message(&body, default_failure)))
    }
}

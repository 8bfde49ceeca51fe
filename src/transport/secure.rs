use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::identity::SessionManager;
use crate::routing::{NavMode, Navigator};
use super::interceptors::{HookId, Interceptors, RequestHook, ResponseHook};
use super::{error_from_response, is_authorization_failure, AuthScheme};

const DEFAULT_FAILURE: &str = "Request failed. Please try again.";

/// Request stage: attach the persisted credential, if any.
pub struct CredentialInjector {
    session: Arc<SessionManager>,
    scheme: AuthScheme,
}

impl CredentialInjector {
    pub fn new(session: Arc<SessionManager>, scheme: AuthScheme) -> Self { Self { session, scheme } }
}

impl RequestHook for CredentialInjector {
    fn on_request(&self, req: &mut Request) -> AuthResult<()> {
        // read from the store rather than memory so a re-created handle still sees the latest token
        if let Some(cred) = self.session.stored_credential() {
            req.headers_mut().insert(AUTHORIZATION, self.scheme.header_value(&cred)?);
        }
        Ok(())
    }
}

/// Response stage: on 401/403 log out and force the entry view.
pub struct SessionTeardown {
    session: Arc<SessionManager>,
    nav: Arc<dyn Navigator>,
    entry: String,
}

impl SessionTeardown {
    pub fn new(session: Arc<SessionManager>, nav: Arc<dyn Navigator>, entry: impl Into<String>) -> Self {
        Self { session, nav, entry: entry.into() }
    }
}

impl ResponseHook for SessionTeardown {
    fn on_response(&self, status: StatusCode) {
        if is_authorization_failure(status) {
            warn!(status = status.as_u16(), "authorization failure; ending session");
            self.session.logout();
            self.nav.navigate(&self.entry, NavMode::Replace);
        }
    }
}

/// Hooks registered by [`SecureClient::attach`]; dropping it ejects them.
#[must_use = "hooks are ejected as soon as the attachment is dropped"]
pub struct Attachment {
    interceptors: Arc<Interceptors>,
    request: HookId,
    response: HookId,
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.interceptors.eject_request(self.request);
        self.interceptors.eject_response(self.response);
        debug!(request = self.request, response = self.response, "interceptors ejected");
    }
}

/// Client for privileged calls.
#[derive(Clone)]
pub struct SecureClient {
    http: reqwest::Client,
    config: ClientConfig,
    interceptors: Arc<Interceptors>,
}

impl SecureClient {
    pub fn new(config: ClientConfig, jar: Arc<Jar>) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config, interceptors: Arc::new(Interceptors::new()) })
    }

    pub fn config(&self) -> &ClientConfig { &self.config }

    pub fn interceptors(&self) -> &Arc<Interceptors> { &self.interceptors }

    /// Register credential injection and teardown for one consumer.
    pub fn attach(&self, session: Arc<SessionManager>, nav: Arc<dyn Navigator>, entry: &str) -> Attachment {
        let request = self.interceptors.use_request(Arc::new(CredentialInjector::new(session.clone(), self.config.auth_scheme)));
        let response = self.interceptors.use_response(Arc::new(SessionTeardown::new(session, nav, entry)));
        debug!(request, response, "interceptors attached");
        Attachment { interceptors: self.interceptors.clone(), request, response }
    }

    pub fn request(&self, method: Method, path: &str) -> AuthResult<RequestBuilder> {
        Ok(self.http.request(method, self.config.endpoint(path)?))
    }

    /// Run a request through the pipeline. Non-2xx statuses come back as errors,
    /// after every response hook has run.
    pub async fn send(&self, builder: RequestBuilder) -> AuthResult<Response> {
        let mut req = builder.build()?;
        self.interceptors.run_request(&mut req)?;
        let method = req.method().clone();
        let url = req.url().clone();
        let resp = self.http.execute(req).await.map_err(|e| {
            warn!(%method, %url, error = %e, "request did not complete");
            AuthError::from(e)
        })?;
        let status = resp.status();
        self.interceptors.run_response(status);
        if status.is_success() {
            debug!(%method, %url, status = status.as_u16(), "ok");
            return Ok(resp);
        }
        Err(error_from_response(resp, DEFAULT_FAILURE).await)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        let resp = self.send(self.request(Method::GET, path)?).await?;
        Ok(resp.json::<T>().await?)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AuthResult<T> {
        let resp = self.send(self.request(Method::POST, path)?.json(body)).await?;
        Ok(resp.json::<T>().await?)
    }

    /// POST with no body; the response body is ignored.
    pub async fn post_empty(&self, path: &str) -> AuthResult<StatusCode> {
        Ok(self.send(self.request(Method::POST, path)?).await?.status())
    }

    pub async fn delete(&self, path: &str) -> AuthResult<StatusCode> {
        Ok(self.send(self.request(Method::DELETE, path)?).await?.status())
    }
}

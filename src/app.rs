//! Wiring for a client process.
//!
//! `AdminApp` owns one cookie jar, one [`SessionManager`] and both transports, and
//! hands the same session handle to every consumer. Building it hydrates the session.

use std::sync::Arc;

use reqwest::cookie::Jar;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::AuthResult;
use crate::identity::{CompanionCookie, HydrateOutcome, SessionManager, SessionStore, UserRecord};
use crate::routing::{Navigator, RouteTable};
use crate::transport::{Attachment, PublicClient, SecureClient};
use crate::workflows::{LoginRequest, LoginWorkflow, LogoutWorkflow};

pub struct AdminApp {
    pub config: ClientConfig,
    pub session: Arc<SessionManager>,
    pub secure: SecureClient,
    pub public: PublicClient,
    pub routes: RouteTable,
    pub nav: Arc<dyn Navigator>,
    jar: Arc<Jar>,
    hydrated: HydrateOutcome,
}

impl AdminApp {
    pub fn start(config: ClientConfig, store: Arc<dyn SessionStore>, nav: Arc<dyn Navigator>) -> AuthResult<Self> {
        let jar = Arc::new(Jar::default());
        let cookie = CompanionCookie::new(jar.clone(), config.cookie_url());
        let session = Arc::new(SessionManager::new(store, config.privileged_role.clone()).with_cookie(cookie));
        let hydrated = session.hydrate();
        info!(outcome = ?hydrated, api = %config.api_base, "session hydrated");
        let secure = SecureClient::new(config.clone(), jar.clone())?;
        let public = PublicClient::new(config.clone(), jar.clone(), session.clone())?;
        Ok(Self { config, session, secure, public, routes: RouteTable::default(), nav, jar, hydrated })
    }

    pub fn hydrated(&self) -> &HydrateOutcome { &self.hydrated }

    pub fn jar(&self) -> Arc<Jar> { self.jar.clone() }

    /// Attach the secure client's hooks for a consumer's lifetime.
    pub fn attach(&self) -> Attachment {
        self.secure.attach(self.session.clone(), self.nav.clone(), self.routes.guard().entry())
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthResult<UserRecord> {
        LoginWorkflow::new(self.public.clone(), self.session.clone(), self.nav.clone())
            .run(&LoginRequest::new(email, password))
            .await
    }

    pub async fn logout(&self) {
        LogoutWorkflow::new(self.session.clone(), self.nav.clone())
            .with_client(self.secure.clone())
            .run()
            .await
    }

    /// Navigate to `path` through the route table; returns the rendered view.
    pub fn open(&self, path: &str) -> Option<String> {
        self.routes.open(path, &self.session, self.nav.as_ref())
    }
}

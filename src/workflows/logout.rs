use std::sync::Arc;

use tracing::{info, warn};

use crate::identity::SessionManager;
use crate::routing::{NavMode, Navigator, ENTRY_PATH};
use crate::transport::SecureClient;

pub struct LogoutWorkflow {
    client: Option<SecureClient>,
    session: Arc<SessionManager>,
    nav: Arc<dyn Navigator>,
    entry: String,
}

impl LogoutWorkflow {
    pub fn new(session: Arc<SessionManager>, nav: Arc<dyn Navigator>) -> Self {
        Self { client: None, session, nav, entry: ENTRY_PATH.to_string() }
    }

    /// Use `client` for the revocation call when the config names a logout path.
    pub fn with_client(mut self, client: SecureClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Notify the server (best effort), then clear the session and go to the entry view.
    pub async fn run(&self) {
        if let Some(client) = &self.client {
            if let Some(path) = client.config().logout_path.clone() {
                match client.post_empty(&path).await {
                    Ok(status) => info!(status = status.as_u16(), "revocation acknowledged"),
                    Err(e) => warn!(error = %e, "logout notification failed; continuing with local logout"),
                }
            }
        }
        self.session.logout();
        self.nav.navigate(&self.entry, NavMode::Replace);
    }
}

use crate::identity::SessionManager;
use super::navigator::{NavMode, Navigator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect { to: String, mode: NavMode },
}

/// Gate for privileged views. Evaluated fresh on every navigation; nothing is cached
/// because the session can change between attempts.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    entry: String,
}

impl RouteGuard {
    pub fn new(entry: impl Into<String>) -> Self { Self { entry: entry.into() } }

    pub fn entry(&self) -> &str { &self.entry }

    pub fn check(&self, session: &SessionManager) -> GuardDecision {
        let has_credential = session.credential().map(|c| !c.is_empty()).unwrap_or(false);
        if session.is_authenticated() && has_credential {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect { to: self.entry.clone(), mode: NavMode::Replace }
        }
    }

    /// Produce the privileged view via `children` only when allowed; otherwise
    /// redirect to the entry view and return None without calling `children`.
    pub fn render<T, F: FnOnce() -> T>(&self, session: &SessionManager, nav: &dyn Navigator, children: F) -> Option<T> {
        match self.check(session) {
            GuardDecision::Allow => Some(children()),
            GuardDecision::Redirect { to, mode } => {
                nav.navigate(&to, mode);
                None
            }
        }
    }
}

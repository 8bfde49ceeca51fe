//! Navigation surface: the entry view, guarded privileged views, and the table
//! that maps locations to them.

mod guard;
mod navigator;

pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{HistoryNavigator, NavEvent, NavMode, Navigator};

use crate::identity::SessionManager;

pub const ENTRY_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Always rendered (the entry/login view).
    Public,
    /// Rendered only when the guard allows it.
    Guarded,
    /// Forwards to another path, replacing history.
    Redirect(String),
}

#[derive(Debug, Clone)]
struct RouteEntry {
    path: String,
    kind: RouteKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(String),
    Redirect { to: String, mode: NavMode },
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    guard: RouteGuard,
}

impl Default for RouteTable {
    /// `/` forwards to the dashboard, `/login` is the entry view, `/dashboard` is guarded.
    fn default() -> Self {
        Self::new(ENTRY_PATH)
            .redirect("/", DASHBOARD_PATH)
            .public(ENTRY_PATH)
            .guarded(DASHBOARD_PATH)
    }
}

impl RouteTable {
    pub fn new(entry: &str) -> Self { Self { routes: Vec::new(), guard: RouteGuard::new(entry) } }

    pub fn public(self, path: &str) -> Self { self.with(path, RouteKind::Public) }
    pub fn guarded(self, path: &str) -> Self { self.with(path, RouteKind::Guarded) }
    pub fn redirect(self, path: &str, to: &str) -> Self { self.with(path, RouteKind::Redirect(to.to_string())) }

    fn with(mut self, path: &str, kind: RouteKind) -> Self {
        let path = normalize(path);
        self.routes.retain(|r| r.path != path);
        self.routes.push(RouteEntry { path, kind });
        self
    }

    pub fn guard(&self) -> &RouteGuard { &self.guard }

    pub fn kind(&self, path: &str) -> Option<&RouteKind> {
        let p = normalize(path);
        self.routes.iter().find(|r| r.path == p).map(|r| &r.kind)
    }

    pub fn resolve(&self, path: &str, session: &SessionManager) -> Resolution {
        match self.kind(path) {
            None => Resolution::NotFound,
            Some(RouteKind::Public) => Resolution::Render(normalize(path)),
            Some(RouteKind::Redirect(to)) => Resolution::Redirect { to: to.clone(), mode: NavMode::Replace },
            Some(RouteKind::Guarded) => match self.guard.check(session) {
                GuardDecision::Allow => Resolution::Render(normalize(path)),
                GuardDecision::Redirect { to, mode } => Resolution::Redirect { to, mode },
            },
        }
    }

    /// Navigate to `path`, following redirects, and return the view that ends up
    /// rendered (None for unknown paths or a redirect loop).
    pub fn open(&self, path: &str, session: &SessionManager, nav: &dyn Navigator) -> Option<String> {
        let mut current = path.to_string();
        nav.navigate(&current, NavMode::Push);
        for _ in 0..8 {
            match self.resolve(&current, session) {
                Resolution::Render(view) => return Some(view),
                Resolution::NotFound => return None,
                Resolution::Redirect { to, mode } => {
                    nav.navigate(&to, mode);
                    current = to;
                }
            }
        }
        tracing::warn!(path, "redirect loop while resolving route");
        None
    }
}

fn normalize(path: &str) -> String {
    let p = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = p.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{}", trimmed) }
}

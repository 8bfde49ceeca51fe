use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    Push,
    /// Replace the current history entry; the stack does not grow.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEvent {
    pub to: String,
    pub mode: NavMode,
}

/// Navigation capability handed to guards, transports and workflows.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: &str, mode: NavMode);
}

/// In-process history: a stack of locations plus a log of every navigation.
#[derive(Debug)]
pub struct HistoryNavigator {
    inner: Mutex<History>,
}

#[derive(Debug)]
struct History {
    stack: Vec<String>,
    events: Vec<NavEvent>,
}

impl HistoryNavigator {
    pub fn new(start: &str) -> Self {
        Self { inner: Mutex::new(History { stack: vec![start.to_string()], events: Vec::new() }) }
    }

    pub fn location(&self) -> String {
        self.inner.lock().stack.last().cloned().unwrap_or_default()
    }

    pub fn depth(&self) -> usize { self.inner.lock().stack.len() }

    pub fn events(&self) -> Vec<NavEvent> { self.inner.lock().events.clone() }

    /// Number of recorded navigations to `to`.
    pub fn count_to(&self, to: &str) -> usize {
        self.inner.lock().events.iter().filter(|e| e.to == to).count()
    }

    /// Pop one entry; returns the new location, or None at the root.
    pub fn back(&self) -> Option<String> {
        let mut h = self.inner.lock();
        if h.stack.len() <= 1 { return None; }
        h.stack.pop();
        h.stack.last().cloned()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self { Self::new("/") }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, to: &str, mode: NavMode) {
        let mut h = self.inner.lock();
        match mode {
            NavMode::Push => h.stack.push(to.to_string()),
            NavMode::Replace => match h.stack.last_mut() {
                Some(top) => *top = to.to_string(),
                None => h.stack.push(to.to_string()),
            },
        }
        h.events.push(NavEvent { to: to.to_string(), mode });
        debug!(to, ?mode, "navigate");
    }
}

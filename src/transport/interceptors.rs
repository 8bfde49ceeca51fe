use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{Request, StatusCode};

use crate::error::AuthResult;

pub type HookId = u64;

/// Runs before a request is sent; may edit headers.
pub trait RequestHook: Send + Sync {
    fn on_request(&self, req: &mut Request) -> AuthResult<()>;
}

/// Observes the status of every response before it reaches the caller.
pub trait ResponseHook: Send + Sync {
    fn on_response(&self, status: StatusCode);
}

/// Registry of request/response hooks, run in registration order.
#[derive(Default)]
pub struct Interceptors {
    next: AtomicU64,
    request: RwLock<Vec<(HookId, Arc<dyn RequestHook>)>>,
    response: RwLock<Vec<(HookId, Arc<dyn ResponseHook>)>>,
}

impl Interceptors {
    pub fn new() -> Self { Self::default() }

    fn next_id(&self) -> HookId { self.next.fetch_add(1, Ordering::Relaxed) + 1 }

    pub fn use_request(&self, hook: Arc<dyn RequestHook>) -> HookId {
        let id = self.next_id();
        self.request.write().push((id, hook));
        id
    }

    pub fn use_response(&self, hook: Arc<dyn ResponseHook>) -> HookId {
        let id = self.next_id();
        self.response.write().push((id, hook));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn eject_request(&self, id: HookId) -> bool {
        let mut v = self.request.write();
        let before = v.len();
        v.retain(|(i, _)| *i != id);
        v.len() != before
    }

    pub fn eject_response(&self, id: HookId) -> bool {
        let mut v = self.response.write();
        let before = v.len();
        v.retain(|(i, _)| *i != id);
        v.len() != before
    }

    pub fn request_count(&self) -> usize { self.request.read().len() }
    pub fn response_count(&self) -> usize { self.response.read().len() }

    pub(crate) fn run_request(&self, req: &mut Request) -> AuthResult<()> {
        // snapshot so a hook may (de)register without deadlocking
        let hooks: Vec<Arc<dyn RequestHook>> = self.request.read().iter().map(|(_, h)| h.clone()).collect();
        for h in hooks {
            h.on_request(req)?;
        }
        Ok(())
    }

    pub(crate) fn run_response(&self, status: StatusCode) {
        let hooks: Vec<Arc<dyn ResponseHook>> = self.response.read().iter().map(|(_, h)| h.clone()).collect();
        for h in hooks {
            h.on_response(status);
        }
    }
}

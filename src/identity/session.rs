//! Session state machine.
//!
//! `SessionManager` owns the single live [`Session`] for a client process. It is
//! hydrated once from the [`SessionStore`](super::store::SessionStore) at startup
//! and afterwards only changes wholesale through [`SessionManager::login`] or
//! [`SessionManager::logout`]. Mutations are serialized; readers always see
//! either the previous or the complete new session.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{AuthError, AuthResult};
use super::claims::{self, Credential};
use super::clock::{Clock, SystemClock};
use super::store::{CompanionCookie, SessionSlots, SessionStore};
use super::user::UserRecord;

/// Live session. `Active` carries both halves, so one can never exist without the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Absent,
    Active { user: UserRecord, credential: Credential },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticated,
}

/// What hydration found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrateOutcome {
    NoSession,
    Restored(UserRecord),
    /// Stored state was unusable and has been cleared.
    Rejected(AuthError),
}

pub struct SessionManager {
    slots: SessionSlots,
    cookie: Option<CompanionCookie>,
    clock: Arc<dyn Clock>,
    privileged_role: String,
    state: RwLock<Session>,
    mutation: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, privileged_role: impl Into<String>) -> Self {
        Self {
            slots: SessionSlots::new(store),
            cookie: None,
            clock: Arc::new(SystemClock),
            privileged_role: privileged_role.into(),
            state: RwLock::new(Session::Absent),
            mutation: Mutex::new(()),
        }
    }

    pub fn with_cookie(mut self, cookie: CompanionCookie) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn privileged_role(&self) -> &str { &self.privileged_role }

    /// Derive the in-memory session from persisted state. Any unusable or
    /// inconsistent state is cleared as by `logout` rather than trusted. Holds the
    /// mutation lock throughout, so a concurrent login/logout lands before or after.
    pub fn hydrate(&self) -> HydrateOutcome {
        let _g = self.mutation.lock();
        let stored = match self.slots.credential() {
            Ok(c) => c,
            Err(e) => return self.reject(e),
        };
        let user_json = match self.slots.user_json() {
            Ok(u) => u,
            Err(e) => return self.reject(e),
        };
        let Some(credential) = stored else {
            if user_json.is_some() {
                debug!("user record without credential in store; clearing");
                self.teardown();
            } else {
                *self.state.write() = Session::Absent;
            }
            return HydrateOutcome::NoSession;
        };

        let claims = match claims::decode(&credential) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "failed to decode stored credential");
                return self.reject(e);
            }
        };
        if claims::is_expired(&claims, self.clock.now()) {
            debug!(exp = claims.expires_at, "stored credential expired");
            return self.reject(AuthError::ExpiredCredential { expires_at: claims.expires_at });
        }
        if claims.role != self.privileged_role {
            warn!(role = %claims.role, "stored credential does not carry the privileged role; logging out");
            return self.reject(AuthError::UnauthorizedRole { role: claims.role });
        }

        let user = match user_json {
            Some(s) => match serde_json::from_str::<UserRecord>(&s) {
                Ok(u) if u.has_role(&self.privileged_role) => u,
                Ok(u) => {
                    warn!(role = %u.role, "stored user record does not carry the privileged role; logging out");
                    return self.reject(AuthError::UnauthorizedRole { role: u.role });
                }
                Err(e) => return self.reject(AuthError::storage(format!("unreadable user record: {}", e))),
            },
            None => UserRecord::from_claims(&claims),
        };

        if let Some(cookie) = &self.cookie {
            cookie.set(&credential);
        }
        *self.state.write() = Session::Active { user: user.clone(), credential };
        info!(user_id = %user.id, email = %user.email, "session restored");
        HydrateOutcome::Restored(user)
    }

    // caller holds `mutation`
    fn reject(&self, err: AuthError) -> HydrateOutcome {
        self.teardown();
        HydrateOutcome::Rejected(err)
    }

    /// Establish a session. A record without the privileged role tears down any
    /// existing session and is refused.
    pub fn login(&self, user: UserRecord, credential: Credential) -> AuthResult<()> {
        if !user.has_role(&self.privileged_role) {
            warn!(role = %user.role, "only {} users can log in", self.privileged_role);
            self.logout();
            return Err(AuthError::UnauthorizedRole { role: user.role });
        }
        if credential.is_empty() {
            self.logout();
            return Err(AuthError::malformed("empty credential"));
        }

        let _g = self.mutation.lock();
        if let Err(e) = self.slots.write(&user, &credential) {
            error!(error = %e, "failed to persist session");
            self.teardown();
            return Err(e);
        }
        if let Some(cookie) = &self.cookie {
            cookie.set(&credential);
        }
        info!(user_id = %user.id, email = %user.email, "logged in");
        *self.state.write() = Session::Active { user, credential };
        Ok(())
    }

    /// Clear memory, both store slots and the cookie. Safe to call repeatedly.
    pub fn logout(&self) {
        let _g = self.mutation.lock();
        let was_active = matches!(*self.state.read(), Session::Active { .. });
        self.teardown();
        if was_active { info!("logged out"); } else { debug!("logout on empty session"); }
    }

    // caller holds `mutation`
    fn teardown(&self) {
        *self.state.write() = Session::Absent;
        if let Err(e) = self.slots.clear() {
            error!(error = %e, "failed to clear persisted session");
        }
        if let Some(cookie) = &self.cookie {
            cookie.clear();
        }
    }

    pub fn status(&self) -> SessionStatus {
        match &*self.state.read() {
            Session::Active { .. } => SessionStatus::Authenticated,
            Session::Absent => SessionStatus::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        match &*self.state.read() {
            Session::Active { credential, .. } => !credential.is_empty(),
            Session::Absent => false,
        }
    }

    pub fn snapshot(&self) -> Session { self.state.read().clone() }

    pub fn user(&self) -> Option<UserRecord> {
        match &*self.state.read() {
            Session::Active { user, .. } => Some(user.clone()),
            Session::Absent => None,
        }
    }

    pub fn credential(&self) -> Option<Credential> {
        match &*self.state.read() {
            Session::Active { credential, .. } => Some(credential.clone()),
            Session::Absent => None,
        }
    }

    /// Credential as persisted, read fresh from the store.
    pub fn stored_credential(&self) -> Option<Credential> {
        self.slots.credential().unwrap_or_else(|e| {
            warn!(error = %e, "could not read stored credential");
            None
        })
    }
}

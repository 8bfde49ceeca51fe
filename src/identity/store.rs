//! Durable session persistence.
//! Two key/value slots (raw credential, serialized user record) survive restarts;
//! a companion cookie in the HTTP client's jar carries the raw credential on the wire.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};
use super::claims::Credential;
use super::user::UserRecord;

pub const TOKEN_KEY: &str = "access-token";
pub const USER_KEY: &str = "user";
pub const COOKIE_NAME: &str = "access-token";
const SESSION_FILE: &str = "session.json";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> AuthResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AuthResult<()>;
    fn remove(&self, key: &str) -> AuthResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self { Self::default() }
    pub fn is_empty(&self) -> bool { self.slots.read().is_empty() }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> AuthResult<Option<String>> { Ok(self.slots.read().get(key).cloned()) }
    fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&self, key: &str) -> AuthResult<()> {
        self.slots.write().remove(key);
        Ok(())
    }
}

/// JSON object persisted at `<dir>/session.json`. Writes go to a sibling temp
/// file and are renamed into place so a crash never leaves a torn file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> AuthResult<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self { path: dir.as_ref().join(SESSION_FILE), lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn load(&self) -> AuthResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s)
                .map_err(|e| AuthError::storage(format!("corrupt session file {}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> AuthResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let _g = self.lock.lock();
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        let _g = self.lock.lock();
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> AuthResult<()> {
        let _g = self.lock.lock();
        // a corrupt file is replaced rather than blocking the removal
        let mut map = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable session file");
            BTreeMap::new()
        });
        map.remove(key);
        self.save(&map)
    }
}

/// Typed access to the two session slots.
#[derive(Clone)]
pub struct SessionSlots {
    store: Arc<dyn SessionStore>,
}

impl SessionSlots {
    pub fn new(store: Arc<dyn SessionStore>) -> Self { Self { store } }

    pub fn credential(&self) -> AuthResult<Option<Credential>> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|s| !s.trim().is_empty()).map(Credential::new))
    }

    /// Raw serialized record; parsing is left to the caller so a corrupt
    /// record can be told apart from a missing one.
    pub fn user_json(&self) -> AuthResult<Option<String>> { self.store.get(USER_KEY) }

    pub fn write(&self, user: &UserRecord, credential: &Credential) -> AuthResult<()> {
        self.store.set(TOKEN_KEY, credential.as_str())?;
        self.store.set(USER_KEY, &serde_json::to_string(user)?)?;
        Ok(())
    }

    /// Remove both slots. Both removals are attempted; the first error is returned.
    pub fn clear(&self) -> AuthResult<()> {
        let a = self.store.remove(TOKEN_KEY);
        let b = self.store.remove(USER_KEY);
        a.and(b)
    }
}

/// Cookie mirror of the credential, scoped to the API origin at path `/`.
#[derive(Clone)]
pub struct CompanionCookie {
    jar: Arc<Jar>,
    url: Url,
}

impl CompanionCookie {
    pub fn new(jar: Arc<Jar>, url: Url) -> Self { Self { jar, url } }

    pub fn jar(&self) -> Arc<Jar> { self.jar.clone() }

    pub fn set(&self, credential: &Credential) {
        let secure = if self.url.scheme() == "https" { "; Secure" } else { "" };
        let c = format!("{}={}; Path=/; SameSite=Strict{}", COOKIE_NAME, credential.as_str(), secure);
        self.jar.add_cookie_str(&c, &self.url);
        debug!(url = %self.url, "companion cookie set");
    }

    /// Expire the cookie with a timestamp in the past.
    pub fn clear(&self) {
        let c = format!("{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/", COOKIE_NAME);
        self.jar.add_cookie_str(&c, &self.url);
    }

    pub fn read(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let s = header.to_str().ok()?;
        for part in s.split(';') {
            let p = part.trim();
            if let Some((k, v)) = p.split_once('=') {
                if k == COOKIE_NAME && !v.is_empty() { return Some(v.to_string()); }
            }
        }
        None
    }
}

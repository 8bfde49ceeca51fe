//! Client configuration.
//! Defaults target a local development API; every field can be overridden through
//! `WARDEN_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AuthError, AuthResult};
use crate::transport::AuthScheme;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3333/api/v1/";
pub const DEFAULT_PRIVILEGED_ROLE: &str = "ADMIN";
pub const LOGIN_PATH: &str = "auth/login";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; always ends with '/' so relative paths join beneath it.
    pub api_base: Url,
    /// Directory holding the persisted session file.
    pub state_dir: PathBuf,
    pub auth_scheme: AuthScheme,
    /// Optional revocation endpoint called best-effort on logout.
    pub logout_path: Option<String>,
    pub timeout: Duration,
    pub privileged_role: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            state_dir: PathBuf::from(".warden"),
            auth_scheme: AuthScheme::Bearer,
            logout_path: None,
            timeout: Duration::from_secs(30),
            privileged_role: DEFAULT_PRIVILEGED_ROLE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base(base: &str) -> AuthResult<Self> {
        Ok(Self { api_base: parse_base(base)?, ..Self::default() })
    }

    /// Build from `WARDEN_*` environment variables, falling back to defaults.
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> AuthResult<Self> {
        let mut cfg = Self::default();
        if let Some(base) = get("WARDEN_API_BASE") {
            cfg.api_base = parse_base(&base)?;
        }
        if let Some(dir) = get("WARDEN_STATE_DIR") {
            cfg.state_dir = PathBuf::from(dir);
        }
        if let Some(s) = get("WARDEN_AUTH_SCHEME") {
            cfg.auth_scheme = s.parse()?;
        }
        if let Some(p) = get("WARDEN_LOGOUT_PATH") {
            let p = p.trim().to_string();
            cfg.logout_path = if p.is_empty() { None } else { Some(p) };
        }
        if let Some(t) = get("WARDEN_TIMEOUT_SECS") {
            let secs: u64 = t.trim().parse()
                .map_err(|_| AuthError::config(format!("WARDEN_TIMEOUT_SECS must be an integer, got '{}'", t)))?;
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(r) = get("WARDEN_PRIVILEGED_ROLE") {
            if r.trim().is_empty() { return Err(AuthError::config("WARDEN_PRIVILEGED_ROLE must not be empty")); }
            cfg.privileged_role = r.trim().to_string();
        }
        Ok(cfg)
    }

    /// Resolve a path relative to the API root. Leading '/' is ignored so that
    /// "/auth/login" and "auth/login" both stay under the base path.
    pub fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Origin the companion cookie is scoped to.
    pub fn cookie_url(&self) -> Url {
        let mut u = self.api_base.clone();
        u.set_path("/");
        u.set_query(None);
        u
    }
}

fn parse_base(base: &str) -> AuthResult<Url> {
    let mut s = base.trim().to_string();
    if !s.ends_with('/') { s.push('/'); }
    let url = Url::parse(&s).map_err(|e| AuthError::config(format!("invalid base URL '{}': {}", base, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AuthError::config(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(cfg.auth_scheme, AuthScheme::Bearer);
        assert_eq!(cfg.privileged_role, "ADMIN");
        assert!(cfg.logout_path.is_none());
    }

    #[test]
    fn env_overrides_are_applied() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("WARDEN_API_BASE", "https://api.example.com/v2"),
            ("WARDEN_AUTH_SCHEME", "raw"),
            ("WARDEN_LOGOUT_PATH", "/auth/logout"),
            ("WARDEN_TIMEOUT_SECS", "5"),
        ])).unwrap();
        assert_eq!(cfg.api_base.as_str(), "https://api.example.com/v2/");
        assert_eq!(cfg.auth_scheme, AuthScheme::Raw);
        assert_eq!(cfg.logout_path.as_deref(), Some("/auth/logout"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = ClientConfig::from_lookup(lookup(&[("WARDEN_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.code_str(), "config_error");
        let err = ClientConfig::from_lookup(lookup(&[("WARDEN_API_BASE", "ftp://x")])).unwrap_err();
        assert_eq!(err.code_str(), "config_error");
        let err = ClientConfig::from_lookup(lookup(&[("WARDEN_AUTH_SCHEME", "digest")])).unwrap_err();
        assert_eq!(err.code_str(), "config_error");
    }

    #[test]
    fn endpoints_stay_under_base_path() {
        let cfg = ClientConfig::with_base("http://10.0.0.1:3333/api/v1").unwrap();
        assert_eq!(cfg.endpoint("/auth/login").unwrap().as_str(), "http://10.0.0.1:3333/api/v1/auth/login");
        assert_eq!(cfg.endpoint("users").unwrap().as_str(), "http://10.0.0.1:3333/api/v1/users");
        assert_eq!(cfg.cookie_url().as_str(), "http://10.0.0.1:3333/");
    }
}

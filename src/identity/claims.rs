use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AuthError, AuthResult};

/// Raw signed bearer token. Replaced wholesale, never edited.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new<S: Into<String>>(raw: S) -> Self { Self(raw.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.trim().is_empty() }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the token itself
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for Credential {
    fn from(s: String) -> Self { Self(s) }
}

/// Fields carried in the credential payload. Times are seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "id")]
    pub subject_id: String,
    #[serde(rename = "profileId", default, deserialize_with = "null_as_default")]
    pub profile_id: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "iat", default, deserialize_with = "null_as_default")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Optional fields may arrive as `null` as well as be omitted.
pub(crate) fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Decode the payload segment of a `header.payload.signature` token.
/// The signature is not checked; the issuing service owns that trust boundary.
pub fn decode(credential: &Credential) -> AuthResult<Claims> {
    let raw = credential.as_str().trim();
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::malformed(format!("expected 3 segments, found {}", parts.len())));
    }
    if parts[0].is_empty() || parts[1].is_empty() {
        return Err(AuthError::malformed("empty header or payload segment"));
    }
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::malformed(format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice::<Claims>(&payload)
        .map_err(|e| AuthError::malformed(format!("payload is not a claims object: {}", e)))
}

/// True iff `now` has reached the expiry instant.
pub fn is_expired(claims: &Claims, now: i64) -> bool {
    now >= claims.expires_at
}

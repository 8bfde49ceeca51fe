use serde::{Deserialize, Serialize};

use super::claims::{null_as_default, Claims};

/// Public-facing identity of the signed-in actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(rename = "profileId", default, deserialize_with = "null_as_default")]
    pub profile_id: String,
    pub email: String,
    pub role: String,
}

impl UserRecord {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.subject_id.clone(),
            profile_id: claims.profile_id.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool { self.role == role }
}

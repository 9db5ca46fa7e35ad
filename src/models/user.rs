//! Authenticated user model.

use serde::{Deserialize, Serialize};

/// User returned by a successful login, including the session credentials.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Bearer access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

impl AuthenticatedUser {
    /// Profile part of the user, safe to persist next to the credentials.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// User profile persisted in the credential store under `"user"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "crate::models::score::lenient_id")]
    pub id: String,
    pub email: String,
    pub name: String,
}

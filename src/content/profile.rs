use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// Account profile row, keyed by the auth account id. Read by the session
/// gate to derive the authorization flag; not list-managed like content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Profile {
    pub const TABLE: &'static str = "profiles";

    /// Only an explicit admin flag grants admin; anything else is standard.
    pub fn role_flag(&self) -> Role {
        if self.role == "admin" {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

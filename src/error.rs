//! Caller-facing error taxonomy.
//!
//! Five families: validation (local, pre-network), auth (credentials or
//! session), not-found, write, fetch, plus `Busy` for a rejected overlapping
//! write. Nothing here is fatal to the process; every failed operation can be
//! retried by the admin.

use thiserror::Error;

use crate::auth::AuthError;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("a write is already in flight for {0}")]
    Busy(&'static str),
}

impl CoreError {
    /// Auth failures get routed to a sign-in screen rather than an inline
    /// message, so the caller needs to tell them apart.
    pub fn is_auth(&self) -> bool {
        matches!(self, CoreError::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    /// Short message suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation(e) => {
                let mut parts: Vec<&str> =
                    e.violations.iter().map(|v| v.message.as_str()).collect();
                parts.dedup();
                parts.join("; ")
            }
            other => other.to_string(),
        }
    }
}

//! Authentication: the remote auth service seam, the active session, and the
//! session gate that derives the admin/standard role.

pub mod gate;
pub mod memory;
pub mod rest;

pub use gate::{AuthState, Identity, Role, SessionGate};
pub use memory::MemoryAuth;
pub use rest::RestAuth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::validate::{Rule, Schema};

/// An authenticated session as issued by the remote auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub account_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Sign-up either signs the account straight in or leaves it pending an
/// e-mail confirmation step, depending on how the service is configured.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("not signed in")]
    NotSignedIn,

    #[error("auth service failure: {0}")]
    Service(String),
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    /// Previously persisted session, if one is still usable.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;
}

/// Shared read/write view of the active session. The gate writes it on every
/// transition; the REST store reads it for the bearer token on each request.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: Option<Session>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = session;
    }

    pub fn get(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|s| !s.is_expired())
            .map(|s| s.access_token.clone())
    }
}

/// Sign-in / sign-up form input, validated before the service is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn credentials_schema() -> Schema {
    Schema::new()
        .field("email", &[Rule::Email])
        .field("password", &[Rule::MinLen(6)])
}

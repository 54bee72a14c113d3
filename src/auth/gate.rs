//! The session gate: who is signed in, and are they an administrator.
//!
//! A small state machine over the remote auth service. Role derivation reads
//! the profiles table keyed by the account id; anything short of an explicit
//! admin flag means standard access. Consumers subscribe through a watch
//! channel and observe every transition before the triggering call returns.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::{AuthError, AuthService, Session, SessionHandle, SignUpOutcome};
use crate::content::Profile;
use crate::store::{Condition, ContentStore, SelectQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub account_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            AuthState::Authenticated(Identity {
                role: Role::Admin,
                ..
            })
        )
    }
}

#[derive(Clone)]
pub struct SessionGate {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn ContentStore>,
    handle: SessionHandle,
    state_tx: watch::Sender<AuthState>,
}

impl SessionGate {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn ContentStore>,
        handle: SessionHandle,
    ) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Anonymous);
        Self {
            auth,
            store,
            handle,
            state_tx,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Restore a previously persisted session if one is valid and unexpired;
    /// otherwise the gate stays anonymous. Called once at process start.
    pub async fn restore(&self) -> Result<AuthState, AuthError> {
        match self.auth.current_session().await? {
            Some(session) if !session.is_expired() => {
                let identity = self.resolve_identity(&session).await;
                self.transition(Some(session), AuthState::Authenticated(identity.clone()));
                Ok(AuthState::Authenticated(identity))
            }
            _ => {
                self.transition(None, AuthState::Anonymous);
                Ok(AuthState::Anonymous)
            }
        }
    }

    /// Invalid credentials leave the current state untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let session = self.auth.sign_in(email, password).await?;
        let identity = self.resolve_identity(&session).await;
        self.transition(Some(session), AuthState::Authenticated(identity.clone()));
        Ok(identity)
    }

    /// New accounts always come up standard; admin is only ever granted by the
    /// profile record, which a fresh sign-up does not have.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.auth.sign_up(email, password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            let identity = Identity {
                account_id: session.account_id,
                email: session.email.clone(),
                role: Role::Standard,
            };
            self.transition(Some(session.clone()), AuthState::Authenticated(identity));
        }
        Ok(outcome)
    }

    /// The local transition to anonymous is unconditional; a remote failure is
    /// reported afterwards but cannot keep the identity alive.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.handle.get();
        self.transition(None, AuthState::Anonymous);
        match session {
            Some(session) => self.auth.sign_out(&session).await,
            None => Ok(()),
        }
    }

    /// The live session backing a write. Detecting expiry here also tears the
    /// state down so subscribers see the sign-in redirect immediately.
    pub fn require_session(&self) -> Result<Session, AuthError> {
        match self.handle.get() {
            None => Err(AuthError::NotSignedIn),
            Some(session) if session.is_expired() => {
                self.transition(None, AuthState::Anonymous);
                Err(AuthError::SessionExpired)
            }
            Some(session) => Ok(session),
        }
    }

    fn transition(&self, session: Option<Session>, state: AuthState) {
        // Handle first so a notified subscriber already sees the new token
        self.handle.set(session);
        self.state_tx.send_replace(state);
    }

    async fn resolve_identity(&self, session: &Session) -> Identity {
        let role = match self.lookup_role(session.account_id).await {
            Ok(role) => role,
            Err(e) => {
                // A failed lookup must never grant admin
                tracing::warn!("profile lookup failed, assuming standard role: {}", e);
                Role::Standard
            }
        };
        Identity {
            account_id: session.account_id,
            email: session.email.clone(),
            role,
        }
    }

    async fn lookup_role(&self, account_id: Uuid) -> Result<Role, AuthError> {
        let query = SelectQuery::new()
            .filter(Condition::eq("id", account_id.to_string()))
            .limit(1);
        let rows = self
            .store
            .select(Profile::TABLE, query)
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        let role = rows
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value::<Profile>(row.into()).ok())
            .map(|profile| profile.role_flag())
            .unwrap_or(Role::Standard);
        Ok(role)
    }
}

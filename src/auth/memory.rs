//! Fixed-credential auth double for tests and offline development.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{AuthError, AuthService, Session, SignUpOutcome};

struct Account {
    password: String,
    account_id: Uuid,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    active: Option<Session>,
}

#[derive(Default)]
pub struct MemoryAuth {
    inner: Mutex<Inner>,
    confirm_required: bool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a deployment where sign-up requires e-mail confirmation.
    pub fn with_confirmation_required() -> Self {
        Self {
            inner: Mutex::default(),
            confirm_required: true,
        }
    }

    pub fn add_account(&self, email: &str, password: &str) -> Uuid {
        let account_id = Uuid::new_v4();
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                account_id,
            },
        );
        account_id
    }

    /// Force the active session past its expiry, as if time had passed.
    pub fn expire_active(&self) {
        if let Some(session) = self.lock().active.as_mut() {
            session.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn issue(email: &str, account_id: Uuid) -> Session {
        Session {
            account_id,
            email: email.to_string(),
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }
}

#[async_trait]
impl AuthService for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut inner = self.lock();
        let account = inner
            .accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        let session = Self::issue(email, account.account_id);
        inner.active = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut inner = self.lock();
        if inner.accounts.contains_key(email) {
            return Err(AuthError::Service("account already exists".to_string()));
        }
        let account_id = Uuid::new_v4();
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                account_id,
            },
        );
        if self.confirm_required {
            Ok(SignUpOutcome::ConfirmationRequired)
        } else {
            let session = Self::issue(email, account_id);
            inner.active = Some(session.clone());
            Ok(SignUpOutcome::SignedIn(session))
        }
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        self.lock().active = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.lock().active.clone().filter(|s| !s.is_expired()))
    }
}

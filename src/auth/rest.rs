//! Client for the hosted auth service (GoTrue dialect), with session
//! persistence between runs and refresh-token renewal.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::{AuthError, AuthService, Session, SignUpOutcome};
use crate::config::{AuthConfig, StoreConfig};

pub struct RestAuth {
    http: Client,
    base_url: Url,
    api_key: String,
    session_file: PathBuf,
    auto_refresh: bool,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    email: Option<String>,
}

impl RestAuth {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        session_file: PathBuf,
        auto_refresh: bool,
    ) -> Result<Self, AuthError> {
        let base_url = Url::parse(base_url)
            .map_err(|_| AuthError::Service(format!("invalid auth URL: {base_url}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Service(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            session_file,
            auto_refresh,
        })
    }

    pub fn from_config(store: &StoreConfig, auth: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(
            &store.base_url,
            &store.api_key,
            Duration::from_secs(store.request_timeout_secs),
            auth.session_file.clone(),
            auth.auto_refresh,
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::Service(e.to_string()))
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.http.post(url).header("apikey", &self.api_key)
    }

    fn session_from(&self, token: TokenResponse) -> Session {
        Session {
            account_id: token.user.id,
            email: token.user.email.unwrap_or_default(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + ChronoDuration::seconds(token.expires_in),
        }
    }

    fn persist(&self, session: &Session) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.session_file.parent() {
                fs::create_dir_all(parent)?;
            }
            let body = serde_json::to_string_pretty(session)?;
            fs::write(&self.session_file, body)
        };
        if let Err(e) = write() {
            tracing::warn!("failed to persist session: {}", e);
        }
    }

    fn discard_persisted(&self) {
        if let Err(e) = fs::remove_file(&self.session_file) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove persisted session: {}", e);
            }
        }
    }

    fn read_persisted(&self) -> Option<Session> {
        let body = fs::read_to_string(&self.session_file).ok()?;
        serde_json::from_str(&body).ok()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let url = self.endpoint("auth/v1/token?grant_type=refresh_token")?;
        let response = self
            .post(url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::SessionExpired);
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        let session = self.session_from(token);
        self.persist(&session);
        Ok(session)
    }
}

#[async_trait]
impl AuthService for RestAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = self.endpoint("auth/v1/token?grant_type=password")?;
        let response = self
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {
                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Service(e.to_string()))?;
                let session = self.session_from(token);
                self.persist(&session);
                tracing::info!(email, "signed in");
                Ok(session)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AuthError::InvalidCredentials)
            }
            s => Err(AuthError::Service(format!("sign-in failed: {s}"))),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|b| b.get("msg").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(AuthError::Service(format!("sign-up failed: {message}")));
        }

        // Auto-confirm deployments return a full token payload; deployments
        // requiring e-mail confirmation return the bare user instead.
        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        if body.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(body).map_err(|e| AuthError::Service(e.to_string()))?;
            let session = self.session_from(token);
            self.persist(&session);
            Ok(SignUpOutcome::SignedIn(session))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.discard_persisted();
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .post(url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::Service(format!(
                "sign-out failed: {}",
                response.status()
            )))
        }
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.read_persisted() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }
        if self.auto_refresh {
            if let Some(refresh_token) = session.refresh_token.as_deref() {
                match self.refresh(refresh_token).await {
                    Ok(renewed) => return Ok(Some(renewed)),
                    Err(e) => tracing::info!("session refresh failed: {}", e),
                }
            }
        }
        self.discard_persisted();
        Ok(None)
    }
}

//! HTTP client for the hosted table store (PostgREST dialect).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::query::validate_table_name;
use super::{Condition, ContentStore, Row, SelectQuery, StoreError};
use crate::auth::SessionHandle;
use crate::config::StoreConfig;

pub struct RestStore {
    http: Client,
    base_url: Url,
    api_key: String,
    session: SessionHandle,
    log_requests: bool,
}

impl RestStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        session: SessionHandle,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|_| StoreError::InvalidQuery(format!("invalid store URL: {base_url}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            session,
            log_requests: false,
        })
    }

    pub fn from_config(config: &StoreConfig, session: SessionHandle) -> Result<Self, StoreError> {
        let mut store = Self::new(
            &config.base_url,
            &config.api_key,
            Duration::from_secs(config.request_timeout_secs),
            session,
        )?;
        store.log_requests = config.enable_request_logging;
        Ok(store)
    }

    fn table_endpoint(&self, table: &str) -> Result<Url, StoreError> {
        validate_table_name(table)?;
        self.base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| StoreError::InvalidQuery(e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        // Authenticated calls carry the session token; anonymous reads fall
        // back to the project key, matching the hosted client's behavior.
        let bearer = self
            .session
            .bearer_token()
            .unwrap_or_else(|| self.api_key.clone());
        if let Ok(auth) = HeaderValue::from_str(&format!("Bearer {bearer}")) {
            headers.insert(reqwest::header::AUTHORIZATION, auth);
        }
        self.http.request(method, url).headers(headers)
    }

    async fn check(&self, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => status.to_string(),
        };
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(StoreError::Unauthorized(message))
        } else {
            Err(StoreError::Rejected(message))
        }
    }
}

#[async_trait]
impl ContentStore for RestStore {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Row>, StoreError> {
        query.validate()?;
        let url = self.table_endpoint(table)?;
        if self.log_requests {
            tracing::debug!(table, "store select");
        }

        let response = self
            .request(Method::GET, url)
            .query(&query.to_query_pairs())
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let response = self.check(response).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Transport(format!("malformed response: {e}")))
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let url = self.table_endpoint(table)?;
        if self.log_requests {
            tracing::debug!(table, count = rows.len(), "store insert");
        }

        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.check(response).await?;
        Ok(())
    }

    async fn update(&self, table: &str, patch: Row, filter: Condition) -> Result<u64, StoreError> {
        let url = self.table_endpoint(table)?;
        if self.log_requests {
            tracing::debug!(table, column = %filter.column, "store update");
        }

        // return=representation so the affected row count is observable
        let response = self
            .request(Method::PATCH, url)
            .query(&[filter.to_query_pair()])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let response = self.check(response).await?;
        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("malformed response: {e}")))?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, table: &str, filter: Condition) -> Result<u64, StoreError> {
        let url = self.table_endpoint(table)?;
        if self.log_requests {
            tracing::debug!(table, column = %filter.column, "store delete");
        }

        let response = self
            .request(Method::DELETE, url)
            .query(&[filter.to_query_pair()])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let response = self.check(response).await?;
        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("malformed response: {e}")))?;
        Ok(rows.len() as u64)
    }
}

//! Per-entity CRUD over the content store.
//!
//! One repository per table. Reads return the full collection newest first
//! with the id as the stable tiebreak. Writes require a live session and are
//! never retried here; the caller reloads after every successful mutation.

use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::auth::{AuthError, SessionGate};
use crate::content::ContentRecord;
use crate::error::CoreError;
use crate::store::{Condition, ContentStore, Row, SelectQuery, StoreError};

/// Fields only the store may assign.
const SYSTEM_FIELDS: &[&str] = &["id", "created_at"];

pub struct Repository<T> {
    store: Arc<dyn ContentStore>,
    gate: SessionGate,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gate: self.gate.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: ContentRecord> Repository<T> {
    pub fn new(store: Arc<dyn ContentStore>, gate: SessionGate) -> Self {
        Self {
            store,
            gate,
            _phantom: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        T::TABLE
    }

    /// Full collection, newest first. A failed read is an error, never an
    /// empty list.
    pub async fn list_all(&self) -> Result<Vec<T>, CoreError> {
        let query = SelectQuery::new().order_desc("created_at").order_desc("id");
        let rows = self
            .store
            .select(T::TABLE, query)
            .await
            .map_err(|e| CoreError::Fetch(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value::<T>(Value::Object(row))
                    .map_err(|e| CoreError::Fetch(format!("malformed {} row: {e}", T::TABLE)))
            })
            .collect()
    }

    /// Insert a normalized record. The payload must not carry an id or a
    /// creation timestamp; the store assigns both.
    pub async fn create(&self, fields: Row) -> Result<(), CoreError> {
        self.check_payload(&fields)?;
        self.gate.require_session()?;
        self.store
            .insert(T::TABLE, vec![fields])
            .await
            .map_err(write_error)?;
        tracing::debug!(table = T::TABLE, "record created");
        Ok(())
    }

    pub async fn update(&self, id: &str, fields: Row) -> Result<(), CoreError> {
        self.check_payload(&fields)?;
        self.gate.require_session()?;
        let affected = self
            .store
            .update(T::TABLE, fields, Condition::eq("id", id))
            .await
            .map_err(write_error)?;
        if affected == 0 {
            return Err(CoreError::NotFound(format!("{} {id}", T::TABLE)));
        }
        tracing::debug!(table = T::TABLE, id, "record updated");
        Ok(())
    }

    /// Deleting an id that is already gone reports `NotFound` rather than
    /// succeeding silently, so a caller can tell "already gone" apart.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.gate.require_session()?;
        let affected = self
            .store
            .delete(T::TABLE, Condition::eq("id", id))
            .await
            .map_err(write_error)?;
        if affected == 0 {
            return Err(CoreError::NotFound(format!("{} {id}", T::TABLE)));
        }
        tracing::debug!(table = T::TABLE, id, "record deleted");
        Ok(())
    }

    fn check_payload(&self, fields: &Row) -> Result<(), CoreError> {
        for field in SYSTEM_FIELDS {
            if fields.contains_key(*field) {
                return Err(CoreError::Write(format!(
                    "field '{field}' is assigned by the store and cannot be written"
                )));
            }
        }
        Ok(())
    }
}

/// A 401/403 from the store means the token went stale between the local
/// session check and the request; that is an auth failure, not a write bug.
fn write_error(error: StoreError) -> CoreError {
    match error {
        StoreError::Unauthorized(_) => CoreError::Auth(AuthError::SessionExpired),
        other => CoreError::Write(other.to_string()),
    }
}

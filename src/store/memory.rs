//! In-process table store used by tests and offline development.
//!
//! Behaves like the hosted store from the caller's point of view: ids and
//! creation timestamps are assigned here, reads reflect prior writes, and
//! transport failures can be injected per call.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{Condition, ContentStore, Row, SelectQuery, StoreError};

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Row>>,
    last_stamp: Option<DateTime<Utc>>,
    fail_next: Option<StoreError>,
    delay_next_write: Option<std::time::Duration>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next store call, whatever it is.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_next = Some(error);
    }

    /// Stall the next mutation for the given duration, so overlapping-write
    /// behavior can be exercised deterministically.
    pub fn delay_next_write(&self, delay: std::time::Duration) {
        self.lock().delay_next_write = Some(delay);
    }

    /// Seed a table with pre-built rows (ids and timestamps taken as given).
    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map(Vec::len).unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_injected_failure(inner: &mut Inner) -> Result<(), StoreError> {
        match inner.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Strictly increasing timestamps so creation order is recoverable even
    /// when inserts land within the same clock tick.
    fn next_stamp(inner: &mut Inner) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match inner.last_stamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        inner.last_stamp = Some(stamp);
        stamp
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Row>, StoreError> {
        query.validate()?;
        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner)?;
        let rows = inner.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        // the guard must drop before the sleep
        let delay = self.lock().delay_next_write.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner)?;

        for row in &rows {
            if row.contains_key("id") || row.contains_key("created_at") {
                return Err(StoreError::Rejected(
                    "id and created_at are assigned by the store".to_string(),
                ));
            }
        }

        let mut stamped = Vec::with_capacity(rows.len());
        for mut row in rows {
            let stamp = Self::next_stamp(&mut inner);
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            row.insert(
                "created_at".to_string(),
                Value::String(stamp.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
            );
            stamped.push(row);
        }
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stamped);
        Ok(())
    }

    async fn update(&self, table: &str, patch: Row, filter: Condition) -> Result<u64, StoreError> {
        if patch.contains_key("id") || patch.contains_key("created_at") {
            return Err(StoreError::Rejected(
                "id and created_at are immutable".to_string(),
            ));
        }
        let delay = self.lock().delay_next_write.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner)?;

        let mut affected = 0;
        if let Some(rows) = inner.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, filter: Condition) -> Result<u64, StoreError> {
        let delay = self.lock().delay_next_write.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        Self::take_injected_failure(&mut inner)?;

        let Some(rows) = inner.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_increasing_timestamps() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store
                .insert("projects", vec![fields(json!({ "title": format!("p{n}") }))])
                .await
                .unwrap();
        }

        let rows = store
            .select("projects", SelectQuery::new().order_asc("created_at"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        let stamps: Vec<&str> = rows.iter().map(|r| r["created_at"].as_str().unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert!(rows.iter().all(|r| r["id"].is_string()));
    }

    #[tokio::test]
    async fn rejects_caller_supplied_system_fields() {
        let store = MemoryStore::new();
        let err = store
            .insert("projects", vec![fields(json!({ "id": "x", "title": "p" }))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));

        let err = store
            .update(
                "projects",
                fields(json!({ "created_at": "now" })),
                Condition::eq("id", "x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn update_and_delete_report_affected_rows() {
        let store = MemoryStore::new();
        store
            .insert("projects", vec![fields(json!({ "title": "p" }))])
            .await
            .unwrap();
        let rows = store.select("projects", SelectQuery::new()).await.unwrap();
        let id = rows[0]["id"].as_str().unwrap().to_string();

        let affected = store
            .update(
                "projects",
                fields(json!({ "title": "q" })),
                Condition::eq("id", id.clone()),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        assert_eq!(store.delete("projects", Condition::eq("id", id.clone())).await.unwrap(), 1);
        assert_eq!(store.delete("projects", Condition::eq("id", id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delayed_write_runs_on_a_spawned_task() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.delay_next_write(std::time::Duration::from_millis(10));

        // spawning requires the write future to be Send
        let handle = tokio::spawn({
            let store = store.clone();
            async move {
                store
                    .insert("projects", vec![fields(json!({ "title": "p" }))])
                    .await
            }
        });
        handle.await.unwrap().unwrap();
        assert_eq!(store.row_count("projects"), 1);
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::Transport("connection reset".into()));
        assert!(store.select("projects", SelectQuery::new()).await.is_err());
        assert!(store.select("projects", SelectQuery::new()).await.is_ok());
    }
}

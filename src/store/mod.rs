//! Remote content store abstraction.
//!
//! The hosted backend exposes a PostgREST-style table API; everything above this
//! module talks to the `ContentStore` trait so the admin workflow runs the same
//! against the real service (`RestStore`) or the in-process `MemoryStore`.

pub mod memory;
pub mod query;
pub mod rest;

pub use memory::MemoryStore;
pub use query::{Condition, OrderTerm, SelectQuery};
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One table row as it travels over the wire.
pub type Row = Map<String, Value>;

/// Errors from the store transport layer. Translation into the caller-facing
/// taxonomy (fetch vs write vs not-found) happens in the repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch rows from a table. A deliberately empty table yields `Ok(vec![])`;
    /// a failed read is always an error, never an empty list.
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Row>, StoreError>;

    /// Insert fully-normalized rows. Ids and creation timestamps are assigned
    /// by the store, never by the caller.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError>;

    /// Patch rows matching the filter; returns how many rows were touched.
    async fn update(&self, table: &str, patch: Row, filter: Condition) -> Result<u64, StoreError>;

    /// Delete rows matching the filter; returns how many rows were removed.
    async fn delete(&self, table: &str, filter: Condition) -> Result<u64, StoreError>;
}

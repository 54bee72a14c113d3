//! Content entities persisted in the remote store.
//!
//! Each entity module pairs the persisted record with its form input and the
//! input's validation schema. Records carry the server-assigned id and
//! creation timestamp; inputs never do.

pub mod blog;
pub mod contact;
pub mod profile;
pub mod project;

pub use blog::{BlogInput, BlogPost};
pub use contact::{ContactInput, ContactMessage};
pub use profile::Profile;
pub use project::{Project, ProjectInput};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::validate::Schema;

/// A persisted entity: one table, a server-generated string id, a
/// server-generated creation timestamp.
pub trait ContentRecord: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

/// The author-facing shape of a record before persistence. Must pass through
/// its schema (validation + normalization) before it can reach a repository.
pub trait FormInput: Serialize + Send + Sync {
    type Record: ContentRecord;

    fn schema() -> Schema;
}

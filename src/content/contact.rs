use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentRecord, FormInput};
use crate::validate::{Rule, Schema};

/// A visitor submission from the contact section, `contact_messages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord for ContactMessage {
    const TABLE: &'static str = "contact_messages";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormInput for ContactInput {
    type Record = ContactMessage;

    fn schema() -> Schema {
        Schema::new()
            .field("name", &[Rule::MinLen(2)])
            .field("email", &[Rule::Email])
            .field("message", &[Rule::MinLen(10)])
    }
}

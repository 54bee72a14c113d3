use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentRecord, FormInput};
use crate::validate::{Rule, Schema};

/// A long-form post in the `blogs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord for BlogPost {
    const TABLE: &'static str = "blogs";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogInput {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
}

impl FormInput for BlogInput {
    type Record = BlogPost;

    fn schema() -> Schema {
        Schema::new()
            .field("title", &[Rule::MinLen(3)])
            .field("excerpt", &[Rule::MinLen(10)])
            .field("content", &[Rule::MinLen(50)])
            .field("image_url", &[Rule::OptionalUrl])
            .field("category", &[Rule::MinLen(2)])
    }
}

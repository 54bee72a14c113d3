use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentRecord, FormInput};
use crate::validate::{RawTags, Rule, Schema};

/// A portfolio project as stored in the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord for Project {
    const TABLE: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Project form values. Optional fields arrive as empty strings and the
/// technologies list may arrive as one comma-delimited string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub technologies: RawTags,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub live_url: String,
}

impl FormInput for ProjectInput {
    type Record = Project;

    fn schema() -> Schema {
        Schema::new()
            .field("title", &[Rule::MinLen(3)])
            .field("description", &[Rule::MinLen(10)])
            .field("image_url", &[Rule::OptionalUrl])
            .field("technologies", &[Rule::Tags])
            .field("github_url", &[Rule::OptionalUrl])
            .field("live_url", &[Rule::OptionalUrl])
    }
}

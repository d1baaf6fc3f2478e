// src/entity/component.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PromptKind;

/// A reusable text fragment appended to generated output. Components
/// are appended verbatim; placeholders inside component content are
/// never substituted. `category` is a free-form descriptive label and
/// plays no part in composition - only `kind` does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptComponent {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: PromptKind,
    pub created_at: DateTime<Utc>,
}

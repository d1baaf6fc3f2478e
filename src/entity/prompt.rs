// src/entity/prompt.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PromptKind, Tag};

/// A stored prompt. When `is_template` is true the content may carry
/// `{{variable}}` placeholders and `template_variables` lists the names
/// the template declares.
///
/// The declared list is independent of what the content actually
/// references; the validator cross-checks the two for templates. A
/// non-template prompt carrying a variable list is allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PromptKind,
    pub is_template: bool,
    pub template_variables: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

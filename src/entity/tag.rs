// src/entity/tag.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A label prompts can be filed under. Tags have no behavior of their
/// own; they exist for organizing and filtering in the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

//! SQLite-backed persistence for prompts, components and tags.

mod sqlite_store;

pub use sqlite_store::SqliteStore;

use crate::entity::PromptKind;

/// Fields for a new prompt record.
#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub title: String,
    pub content: String,
    pub kind: PromptKind,
    pub is_template: bool,
    pub template_variables: Option<Vec<String>>,
    pub tag_ids: Vec<i64>,
}

/// Partial update for a prompt; `None` fields are left unchanged.
/// `template_variables` is doubly optional so the list can be cleared
/// (`Some(None)`) as well as replaced. A `Some` in `tag_ids` replaces
/// the prompt's tag associations wholesale.
#[derive(Debug, Clone, Default)]
pub struct PromptUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<PromptKind>,
    pub is_template: Option<bool>,
    pub template_variables: Option<Option<Vec<String>>>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Fields for a new component record.
#[derive(Debug, Clone)]
pub struct NewComponent {
    pub name: String,
    pub content: String,
    pub category: String,
    pub kind: PromptKind,
}

/// Partial update for a component; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ComponentUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub kind: Option<PromptKind>,
}

/// Fields for a new tag record.
#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
}

/// Partial update for a tag; `color` is doubly optional so it can be
/// cleared as well as replaced.
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StashError {
    #[error("Not in a promptstash project. Run 'promptstash init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .promptstash/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Template with id {0} not found")]
    TemplateNotFound(i64),

    #[error("Prompt with id {0} is not a template")]
    NotATemplate(i64),

    #[error("Prompt with id {0} not found")]
    PromptNotFound(i64),

    #[error("Component with id {0} not found")]
    ComponentNotFound(i64),

    #[error("Tag with id {0} not found")]
    TagNotFound(i64),

    #[error("Invalid prompt type: {0}")]
    InvalidKind(String),

    #[error("Prompt data failed validation")]
    InvalidPromptData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StashError>;

mod component;
mod kind;
mod prompt;
mod tag;

pub use component::PromptComponent;
pub use kind::PromptKind;
pub use prompt::Prompt;
pub use tag::Tag;

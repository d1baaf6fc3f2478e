//! Template composition and validation engine.
//!
//! Everything here is pure and synchronous: placeholder extraction,
//! variable substitution, type-filtered component composition, and
//! structural validation of untyped prompt records. The generation
//! orchestrator wires the pieces against stored records through the
//! read-only [`PromptSource`] capability.

pub mod compose;
pub mod generate;
pub mod template;
pub mod validate;

pub use compose::append_components;
pub use generate::{generate, GenerateRequest, GeneratedPrompt, PromptSource};
pub use template::{extract_variables, substitute_variables};
pub use validate::{validate_prompt_data, ValidationReport};

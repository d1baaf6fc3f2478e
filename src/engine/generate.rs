// src/engine/generate.rs
//! Generation orchestrator: variable substitution plus component
//! composition against stored records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compose::append_components;
use super::template::substitute_variables;
use crate::entity::{Prompt, PromptComponent};
use crate::error::{Result, StashError};

/// Read-only access to stored prompts and components. The engine never
/// writes; a store (or an in-memory fake in tests) supplies snapshot
/// reads of the records.
pub trait PromptSource {
    fn find_prompt_by_id(&self, id: i64) -> Result<Option<Prompt>>;

    /// Resolve component ids, preserving the order of `ids`. Unknown
    /// ids are skipped.
    fn find_components_by_ids(&self, ids: &[i64]) -> Result<Vec<PromptComponent>>;
}

/// A request to generate content from a stored template. Transient -
/// never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub template_id: i64,
    pub variables: Option<HashMap<String, String>>,
    pub component_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPrompt {
    pub generated_content: String,
}

/// Generate content from a stored template: substitute the declared
/// variables with the caller-supplied values, then append the referenced
/// components that match the template's kind.
///
/// Fails with [`StashError::TemplateNotFound`] when the id does not
/// resolve and [`StashError::NotATemplate`] when the record exists but
/// is not flagged as a template.
pub fn generate<S: PromptSource>(source: &S, request: &GenerateRequest) -> Result<GeneratedPrompt> {
    let template = source
        .find_prompt_by_id(request.template_id)?
        .ok_or(StashError::TemplateNotFound(request.template_id))?;

    if !template.is_template {
        return Err(StashError::NotATemplate(request.template_id));
    }

    let mut generated = template.content.clone();

    if let (Some(values), Some(declared)) = (&request.variables, &template.template_variables) {
        // Only declared names are substituted; values supplied for
        // undeclared names are ignored.
        let applicable: HashMap<String, String> = declared
            .iter()
            .filter_map(|name| values.get(name).map(|value| (name.clone(), value.clone())))
            .collect();
        generated = substitute_variables(&generated, &applicable);
    }

    if let Some(ids) = &request.component_ids {
        if !ids.is_empty() {
            let components = source.find_components_by_ids(ids)?;
            debug!(
                template_id = request.template_id,
                matched = components.len(),
                "appending components"
            );
            generated = append_components(&generated, template.kind, &components);
        }
    }

    Ok(GeneratedPrompt {
        generated_content: generated,
    })
}

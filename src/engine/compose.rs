// src/engine/compose.rs
//! Type-filtered component composition.

use crate::entity::{PromptComponent, PromptKind};

/// Separator between the base text and each appended component block:
/// exactly one blank line.
const SEPARATOR: &str = "\n\n";

/// Append the content of every component whose kind matches `kind`,
/// preserving the order the components were supplied in. When nothing
/// matches, the base text is returned unchanged. Component content is
/// appended verbatim - placeholders inside it are not substituted.
pub fn append_components(
    base: &str,
    kind: PromptKind,
    components: &[PromptComponent],
) -> String {
    let matching: Vec<&str> = components
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.content.as_str())
        .collect();

    if matching.is_empty() {
        return base.to_string();
    }

    format!("{}{}{}", base, SEPARATOR, matching.join(SEPARATOR))
}

// src/engine/template.rs
//! Placeholder extraction and variable substitution.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `{{name}}` where name is one or more word characters
/// (letters, digits, underscore). Case-sensitive; no whitespace
/// tolerated inside the braces. Anything else is simply not a match.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex"));

/// Extract the distinct placeholder names referenced in `text`, in
/// first-occurrence order. Returns an empty list when nothing matches.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in PLACEHOLDER.captures_iter(text) {
        let name = &cap[1];
        if !names.iter().any(|n| n.as_str() == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every occurrence of `{{name}}` for each name present in
/// `variables`. Names without a mapping entry are left untouched, and
/// replacement values are inserted literally - output text is never
/// re-scanned for placeholders, so the result is independent of the
/// order the mapping is traversed in.
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// src/engine/validate.rs
//! Structural validation of untyped prompt records.
//!
//! The import and validate entry points accept free-form JSON, so the
//! checks here run over [`serde_json::Value`] rather than the typed
//! [`crate::entity::Prompt`] record - invalid data must not be able to
//! hide behind static typing. Every violation is accumulated; the only
//! short-circuit is a root value that is not an object, since no field
//! can be inspected in that case.

use serde::Serialize;
use serde_json::{Map, Value};

use super::template::extract_variables;

/// Outcome of validating a candidate prompt record. `errors` is absent
/// when the record is valid.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

/// Validate a loosely-typed prompt record.
///
/// Never fails for malformed input: every problem surfaces as an entry
/// in [`ValidationReport::errors`] so the caller can render all of them
/// at once.
pub fn validate_prompt_data(data: &Value) -> ValidationReport {
    let Some(record) = data.as_object() else {
        return ValidationReport::from_errors(vec![
            "Prompt data must be a valid object".to_string(),
        ]);
    };

    let mut errors = Vec::new();

    check_required_string(record, "title", "Title", &mut errors);
    check_required_string(record, "content", "Content", &mut errors);

    match record.get("type").and_then(Value::as_str) {
        Some("chatgpt") | Some("midjourney") => {}
        _ => errors.push("Type must be either \"chatgpt\" or \"midjourney\"".to_string()),
    }

    if let Some(flag) = record.get("is_template") {
        if !flag.is_boolean() {
            errors.push("is_template must be a boolean value".to_string());
        }
    }

    if let Some(vars) = record.get("template_variables") {
        if !vars.is_null() {
            match vars.as_array() {
                Some(items) => {
                    if items.iter().any(|item| !item.is_string()) {
                        errors.push("All template variables must be strings".to_string());
                    }
                }
                None => {
                    errors.push("template_variables must be an array or null".to_string());
                }
            }
        }
    }

    check_id_list(record, "tag_ids", "tag", &mut errors);
    check_id_list(record, "component_ids", "component", &mut errors);

    if let Some(variables) = record.get("variables") {
        match variables.as_object() {
            Some(map) => {
                // JSON keys are always strings; only values can stray.
                if map.values().any(|value| !value.is_string()) {
                    errors.push("All variable keys and values must be strings".to_string());
                }
            }
            None => errors.push("variables must be an object".to_string()),
        }
    }

    check_variable_consistency(record, &mut errors);

    ValidationReport::from_errors(errors)
}

/// Required field that must be a string with at least one
/// non-whitespace character.
fn check_required_string(
    record: &Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut Vec<String>,
) {
    match record.get(field).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => {}
        _ => errors.push(format!(
            "{} is required and must be a non-empty string",
            label
        )),
    }
}

/// Optional field that, when present, must be an array of positive
/// integers.
fn check_id_list(
    record: &Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut Vec<String>,
) {
    let Some(value) = record.get(field) else {
        return;
    };
    match value.as_array() {
        Some(items) => {
            if items.iter().any(|item| !is_positive_integer(item)) {
                errors.push(format!("All {} IDs must be positive integers", label));
            }
        }
        None => errors.push(format!("{} must be an array", field)),
    }
}

fn is_positive_integer(value: &Value) -> bool {
    value.as_i64().is_some_and(|n| n > 0)
}

/// Cross-check declared variables against the placeholders the content
/// actually uses. Only runs when the record claims to be a template and
/// both sides of the comparison are inspectable; a non-template prompt
/// carrying a variable list is deliberately not flagged.
fn check_variable_consistency(record: &Map<String, Value>, errors: &mut Vec<String>) {
    if record.get("is_template").and_then(Value::as_bool) != Some(true) {
        return;
    }
    let Some(declared) = record.get("template_variables").and_then(Value::as_array) else {
        return;
    };
    let Some(content) = record.get("content").and_then(Value::as_str) else {
        return;
    };

    // Non-string elements were already reported above; compare against
    // the string ones.
    let declared: Vec<&str> = declared.iter().filter_map(Value::as_str).collect();
    let used = extract_variables(content);

    let undeclared: Vec<&str> = used
        .iter()
        .map(String::as_str)
        .filter(|name| !declared.contains(name))
        .collect();
    if !undeclared.is_empty() {
        errors.push(format!(
            "Undeclared template variables found in content: {}",
            undeclared.join(", ")
        ));
    }

    let unused: Vec<&str> = declared
        .iter()
        .copied()
        .filter(|name| !used.iter().any(|u| u.as_str() == *name))
        .collect();
    if !unused.is_empty() {
        errors.push(format!(
            "Declared template variables not used in content: {}",
            unused.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(report: &ValidationReport) -> Vec<String> {
        report.errors.clone().unwrap_or_default()
    }

    #[test]
    fn test_valid_plain_prompt() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "This is a test prompt content",
            "type": "chatgpt",
            "is_template": false
        }));
        assert!(report.valid);
        assert!(report.errors.is_none());
    }

    #[test]
    fn test_valid_template_with_variables() {
        let report = validate_prompt_data(&json!({
            "title": "Template Prompt",
            "content": "Hello {{name}}, your {{item}} is ready",
            "type": "midjourney",
            "is_template": true,
            "template_variables": ["name", "item"]
        }));
        assert!(report.valid);
        assert!(report.errors.is_none());
    }

    #[test]
    fn test_valid_with_all_optional_fields() {
        let report = validate_prompt_data(&json!({
            "title": "Complex Prompt",
            "content": "Generate image with {{style}} style",
            "type": "midjourney",
            "is_template": true,
            "template_variables": ["style"],
            "tag_ids": [1, 2, 3],
            "component_ids": [10, 20],
            "variables": {"style": "photorealistic", "mood": "bright"}
        }));
        assert!(report.valid);
    }

    #[test]
    fn test_non_object_short_circuits() {
        for data in [json!(null), json!("text"), json!([1, 2]), json!(42)] {
            let report = validate_prompt_data(&data);
            assert!(!report.valid);
            assert_eq!(
                errors(&report),
                vec!["Prompt data must be a valid object".to_string()]
            );
        }
    }

    #[test]
    fn test_missing_title() {
        let report = validate_prompt_data(&json!({
            "content": "Content without title",
            "type": "chatgpt"
        }));
        assert!(errors(&report)
            .contains(&"Title is required and must be a non-empty string".to_string()));
    }

    #[test]
    fn test_whitespace_only_title() {
        let report = validate_prompt_data(&json!({
            "title": "   ",
            "content": "Content with empty title",
            "type": "chatgpt"
        }));
        assert!(errors(&report)
            .contains(&"Title is required and must be a non-empty string".to_string()));
    }

    #[test]
    fn test_missing_content() {
        let report = validate_prompt_data(&json!({
            "title": "Title without content",
            "type": "chatgpt"
        }));
        assert!(errors(&report)
            .contains(&"Content is required and must be a non-empty string".to_string()));
    }

    #[test]
    fn test_invalid_type() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "invalid_type"
        }));
        assert!(errors(&report)
            .contains(&"Type must be either \"chatgpt\" or \"midjourney\"".to_string()));
    }

    #[test]
    fn test_non_boolean_is_template() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "is_template": "true"
        }));
        assert!(errors(&report).contains(&"is_template must be a boolean value".to_string()));
    }

    #[test]
    fn test_template_variables_not_array() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "template_variables": "not_an_array"
        }));
        assert!(errors(&report)
            .contains(&"template_variables must be an array or null".to_string()));
    }

    #[test]
    fn test_template_variables_non_string_element() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "template_variables": ["valid", 123, "another_valid"]
        }));
        assert!(errors(&report).contains(&"All template variables must be strings".to_string()));
    }

    #[test]
    fn test_null_template_variables_allowed() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Simple content without variables",
            "type": "chatgpt",
            "is_template": false,
            "template_variables": null
        }));
        assert!(report.valid);
        assert!(report.errors.is_none());
    }

    #[test]
    fn test_tag_ids_not_array() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "tag_ids": "not_an_array"
        }));
        assert!(errors(&report).contains(&"tag_ids must be an array".to_string()));
    }

    #[test]
    fn test_tag_ids_invalid_values() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "tag_ids": [1, "invalid", -5, 0]
        }));
        assert!(errors(&report).contains(&"All tag IDs must be positive integers".to_string()));
    }

    #[test]
    fn test_component_ids_invalid_values() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "component_ids": [1.5, "invalid", -10]
        }));
        assert!(errors(&report)
            .contains(&"All component IDs must be positive integers".to_string()));
    }

    #[test]
    fn test_variables_not_object() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "variables": ["not", "an", "object"]
        }));
        assert!(errors(&report).contains(&"variables must be an object".to_string()));
    }

    #[test]
    fn test_variables_non_string_values() {
        let report = validate_prompt_data(&json!({
            "title": "Test Prompt",
            "content": "Test content",
            "type": "chatgpt",
            "variables": {
                "valid_key": "valid_value",
                "invalid_key": 123,
                "another_invalid": true
            }
        }));
        assert!(errors(&report)
            .contains(&"All variable keys and values must be strings".to_string()));
    }

    #[test]
    fn test_undeclared_variables_detected() {
        let report = validate_prompt_data(&json!({
            "title": "Template Prompt",
            "content": "Hello {{name}}, your {{item}} is ready and {{status}} is good",
            "type": "chatgpt",
            "is_template": true,
            "template_variables": ["name", "item"]
        }));
        assert!(!report.valid);
        assert!(errors(&report)
            .contains(&"Undeclared template variables found in content: status".to_string()));
    }

    #[test]
    fn test_unused_variables_detected_in_declaration_order() {
        let report = validate_prompt_data(&json!({
            "title": "Template Prompt",
            "content": "Hello {{name}}",
            "type": "chatgpt",
            "is_template": true,
            "template_variables": ["name", "unused_var", "another_unused"]
        }));
        assert!(!report.valid);
        assert!(errors(&report).contains(
            &"Declared template variables not used in content: unused_var, another_unused"
                .to_string()
        ));
    }

    #[test]
    fn test_non_template_with_variables_not_flagged() {
        // Deliberately permissive: is_template:false with a populated
        // variable list passes.
        let report = validate_prompt_data(&json!({
            "title": "Plain Prompt",
            "content": "No placeholders here",
            "type": "chatgpt",
            "is_template": false,
            "template_variables": ["leftover"]
        }));
        assert!(report.valid);
    }

    #[test]
    fn test_accumulates_all_violations() {
        let report = validate_prompt_data(&json!({
            "title": "",
            "type": "invalid_type",
            "is_template": "not_boolean",
            "tag_ids": "not_array",
            "template_variables": [123, "valid"]
        }));
        assert!(!report.valid);
        let errors = errors(&report);
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&"Title is required and must be a non-empty string".to_string()));
        assert!(
            errors.contains(&"Content is required and must be a non-empty string".to_string())
        );
        assert!(
            errors.contains(&"Type must be either \"chatgpt\" or \"midjourney\"".to_string())
        );
        assert!(errors.contains(&"is_template must be a boolean value".to_string()));
        assert!(errors.contains(&"tag_ids must be an array".to_string()));
        assert!(errors.contains(&"All template variables must be strings".to_string()));
    }
}

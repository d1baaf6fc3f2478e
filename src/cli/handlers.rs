use std::collections::HashMap;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use serde_json::Value;

use crate::engine::{self, GenerateRequest};
use crate::entity::{Prompt, PromptKind};
use crate::error::{Result, StashError};
use crate::store::{NewComponent, NewPrompt, NewTag, PromptUpdate, SqliteStore};

/// Find the project root by looking for .promptstash/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(".promptstash").exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_store() -> Result<SqliteStore> {
    SqliteStore::open(&find_project_root())
}

fn parse_kind(raw: &str) -> Result<PromptKind> {
    raw.parse()
        .map_err(|_| StashError::InvalidKind(raw.to_string()))
}

/// Content comes from --content, or from stdin when --stdin is passed
/// or input is piped in.
fn resolve_content(content: Option<String>, stdin: bool) -> Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }
    if stdin || !atty::is(atty::Stream::Stdin) {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf.trim_end_matches('\n').to_string());
    }
    Err(StashError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        "no content supplied; pass --content or pipe it via --stdin",
    )))
}

/// Read a JSON document from a file, or from stdin when no file is
/// given.
fn read_json_input(file: Option<PathBuf>) -> Result<Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            if atty::is(atty::Stream::Stdin) {
                eprintln!("Reading JSON from stdin (end with Ctrl-D)...");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let _store = SqliteStore::init(&root)?;
    println!("Initialized promptstash project in {}", root.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add_prompt(
    title: String,
    kind: String,
    content: Option<String>,
    template: bool,
    variables: Vec<String>,
    tag_ids: Vec<i64>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let store = open_store()?;
    let content = resolve_content(content, stdin)?;

    let prompt = store.create_prompt(NewPrompt {
        title,
        content,
        kind: parse_kind(&kind)?,
        is_template: template,
        template_variables: if variables.is_empty() {
            None
        } else {
            Some(variables)
        },
        tag_ids,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        let marker = if prompt.is_template { " (template)" } else { "" };
        println!("Created prompt {}{} - {}", prompt.id, marker, prompt.title);
    }

    Ok(())
}

pub fn handle_add_component(
    name: String,
    kind: String,
    category: String,
    content: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let store = open_store()?;
    let content = resolve_content(content, stdin)?;

    let component = store.create_component(NewComponent {
        name,
        content,
        category,
        kind: parse_kind(&kind)?,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&component)?);
    } else {
        println!("Created component {} - {}", component.id, component.name);
    }

    Ok(())
}

pub fn handle_add_tag(name: String, color: Option<String>, json: bool) -> Result<()> {
    let store = open_store()?;
    let tag = store.create_tag(NewTag { name, color })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tag)?);
    } else {
        println!("Created tag {} - {}", tag.id, tag.name);
    }

    Ok(())
}

pub fn handle_list(what: String, kind: Option<String>, json: bool) -> Result<()> {
    let store = open_store()?;

    match what.as_str() {
        "prompts" | "prompt" => print_prompts(&store.list_prompts()?, json),
        "templates" | "template" => print_prompts(&store.list_templates()?, json),
        "components" | "component" => {
            let components = match kind {
                Some(raw) => store.list_components_by_kind(parse_kind(&raw)?)?,
                None => store.list_components()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&components)?);
            } else {
                for component in &components {
                    println!(
                        "{:>4} [{}] {} ({})",
                        component.id, component.kind, component.name, component.category
                    );
                }
            }
            Ok(())
        }
        "tags" | "tag" => {
            let tags = store.list_tags()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tags)?);
            } else {
                for tag in &tags {
                    match &tag.color {
                        Some(color) => println!("{:>4} {} ({})", tag.id, tag.name, color),
                        None => println!("{:>4} {}", tag.id, tag.name),
                    }
                }
            }
            Ok(())
        }
        other => Err(StashError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "unknown list target '{}' (expected prompts, templates, components, or tags)",
                other
            ),
        ))),
    }
}

fn print_prompts(prompts: &[Prompt], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(prompts)?);
        return Ok(());
    }
    for prompt in prompts {
        let marker = if prompt.is_template { "T" } else { " " };
        println!(
            "{:>4} {} [{}] {}",
            prompt.id, marker, prompt.kind, prompt.title
        );
    }
    Ok(())
}

pub fn handle_get(id: i64, json: bool) -> Result<()> {
    let store = open_store()?;
    let prompt = store.get_prompt(id)?.ok_or(StashError::PromptNotFound(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
        return Ok(());
    }

    println!("{} [{}] {}", prompt.id, prompt.kind, prompt.title);
    if prompt.is_template {
        let variables = prompt
            .template_variables
            .as_deref()
            .unwrap_or_default()
            .join(", ");
        println!("template: yes ({})", variables);
    }
    if !prompt.tags.is_empty() {
        let names: Vec<&str> = prompt.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags: {}", names.join(", "));
    }
    println!();
    println!("{}", prompt.content);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_update(
    id: i64,
    title: Option<String>,
    content: Option<String>,
    kind: Option<String>,
    template: Option<bool>,
    variables: Vec<String>,
    clear_variables: bool,
    tag_ids: Vec<i64>,
    json: bool,
) -> Result<()> {
    let store = open_store()?;

    let template_variables = if clear_variables {
        Some(None)
    } else if !variables.is_empty() {
        Some(Some(variables))
    } else {
        None
    };

    let prompt = store.update_prompt(
        id,
        PromptUpdate {
            title,
            content,
            kind: kind.as_deref().map(parse_kind).transpose()?,
            is_template: template,
            template_variables,
            tag_ids: if tag_ids.is_empty() {
                None
            } else {
                Some(tag_ids)
            },
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("Updated prompt {} - {}", prompt.id, prompt.title);
    }

    Ok(())
}

pub fn handle_delete(what: String, id: i64) -> Result<()> {
    let store = open_store()?;

    let deleted = match what.as_str() {
        "prompt" => store
            .delete_prompt(id)?
            .then_some(())
            .ok_or(StashError::PromptNotFound(id)),
        "component" => store
            .delete_component(id)?
            .then_some(())
            .ok_or(StashError::ComponentNotFound(id)),
        "tag" => store
            .delete_tag(id)?
            .then_some(())
            .ok_or(StashError::TagNotFound(id)),
        other => {
            return Err(StashError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "unknown delete target '{}' (expected prompt, component, or tag)",
                    other
                ),
            )))
        }
    };
    deleted?;

    println!("Deleted {} {}", what, id);
    Ok(())
}

pub fn handle_generate(
    template_id: i64,
    variables: Vec<String>,
    components: Vec<i64>,
    json: bool,
) -> Result<()> {
    let store = open_store()?;

    let mut values = HashMap::new();
    for pair in &variables {
        match pair.split_once('=') {
            Some((name, value)) => {
                values.insert(name.to_string(), value.to_string());
            }
            None => eprintln!(
                "Warning: ignoring malformed variable '{}' (expected NAME=VALUE)",
                pair
            ),
        }
    }

    let request = GenerateRequest {
        template_id,
        variables: (!values.is_empty()).then_some(values),
        component_ids: (!components.is_empty()).then_some(components),
    };

    let generated = engine::generate(&store, &request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
    } else {
        println!("{}", generated.generated_content);
    }

    Ok(())
}

pub fn handle_validate(file: Option<PathBuf>, json: bool) -> Result<()> {
    let data = read_json_input(file)?;
    let report = engine::validate_prompt_data(&data);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        println!("Valid prompt data");
    } else {
        println!("Invalid prompt data:");
        for error in report.errors.as_deref().unwrap_or_default() {
            println!("  - {}", error);
        }
    }

    Ok(())
}

pub fn handle_import(file: Option<PathBuf>, json: bool) -> Result<()> {
    let data = read_json_input(file)?;

    let report = engine::validate_prompt_data(&data);
    if !report.valid {
        for error in report.errors.as_deref().unwrap_or_default() {
            eprintln!("  - {}", error);
        }
        return Err(StashError::InvalidPromptData);
    }

    let store = open_store()?;
    let prompt = store.create_prompt(new_prompt_from_value(&data)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("Imported prompt {} - {}", prompt.id, prompt.title);
    }

    Ok(())
}

pub fn handle_export(id: i64) -> Result<()> {
    let store = open_store()?;
    let prompt = store.get_prompt(id)?.ok_or(StashError::PromptNotFound(id))?;
    println!("{}", serde_json::to_string_pretty(&prompt)?);
    Ok(())
}

/// Build a new-prompt record from JSON the validator has already
/// accepted.
fn new_prompt_from_value(data: &Value) -> Result<NewPrompt> {
    let record = data.as_object().ok_or(StashError::InvalidPromptData)?;

    let kind_raw = record
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(NewPrompt {
        title: record
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        content: record
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        kind: parse_kind(kind_raw)?,
        is_template: record
            .get("is_template")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        template_variables: record
            .get("template_variables")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        tag_ids: record
            .get("tag_ids")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default(),
    })
}

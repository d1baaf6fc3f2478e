use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::engine::PromptSource;
use crate::entity::{Prompt, PromptComponent, PromptKind, Tag};
use crate::error::{Result, StashError};

use super::{ComponentUpdate, NewComponent, NewPrompt, NewTag, PromptUpdate, TagUpdate};

const STASH_DIR: &str = ".promptstash";
const STASH_DB: &str = "stash.db";

/// SQLite store holding prompts, components, tags and the prompt-tag
/// associations
pub struct SqliteStore {
    conn: Connection,
    #[allow(dead_code)]
    path: PathBuf,
}

impl SqliteStore {
    /// Create the store directory and database under `root`. Fails if
    /// a store already exists there.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(STASH_DIR);
        if dir.exists() {
            return Err(StashError::AlreadyInitialized);
        }
        std::fs::create_dir_all(&dir)?;
        Self::open_db(dir.join(STASH_DB))
    }

    /// Open an existing store under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(STASH_DIR);
        if !dir.exists() {
            return Err(StashError::NotInitialized);
        }
        Self::open_db(dir.join(STASH_DB))
    }

    fn open_db(path: PathBuf) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                color TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                type TEXT NOT NULL,
                is_template INTEGER NOT NULL DEFAULT 0,
                template_variables TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS prompt_components (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                type TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS prompt_tags (
                prompt_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (prompt_id, tag_id)
            );

            CREATE INDEX IF NOT EXISTS idx_prompt_tags_tag ON prompt_tags(tag_id);
            ",
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub fn create_tag(&self, tag: NewTag) -> Result<Tag> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO tags (name, color, created_at) VALUES (?1, ?2, ?3)",
            params![tag.name, tag.color, now.to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "created tag");
        Ok(Tag {
            id,
            name: tag.name,
            color: tag.color,
            created_at: now,
        })
    }

    pub fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name, color, created_at FROM tags WHERE id = ?1",
                [id],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, created_at FROM tags ORDER BY id")?;
        let rows = stmt.query_map([], tag_from_row)?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    pub fn update_tag(&self, id: i64, update: TagUpdate) -> Result<Tag> {
        let mut tag = self.get_tag(id)?.ok_or(StashError::TagNotFound(id))?;
        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(color) = update.color {
            tag.color = color;
        }
        self.conn.execute(
            "UPDATE tags SET name = ?1, color = ?2 WHERE id = ?3",
            params![tag.name, tag.color, id],
        )?;
        Ok(tag)
    }

    /// Delete a tag and its prompt associations. Returns whether the
    /// tag existed.
    pub fn delete_tag(&self, id: i64) -> Result<bool> {
        self.conn
            .execute("DELETE FROM prompt_tags WHERE tag_id = ?1", [id])?;
        let affected = self.conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    pub fn create_prompt(&self, prompt: NewPrompt) -> Result<Prompt> {
        let now = Utc::now().to_rfc3339();
        let vars_json = encode_variables(prompt.template_variables.as_ref())?;
        self.conn.execute(
            "INSERT INTO prompts (title, content, type, is_template, template_variables, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                prompt.title,
                prompt.content,
                prompt.kind.as_str(),
                prompt.is_template,
                vars_json,
                now,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        if !prompt.tag_ids.is_empty() {
            self.replace_prompt_tags(id, &prompt.tag_ids)?;
        }
        debug!(id, "created prompt");
        self.get_prompt(id)?.ok_or(StashError::PromptNotFound(id))
    }

    pub fn get_prompt(&self, id: i64) -> Result<Option<Prompt>> {
        let prompt = self
            .conn
            .query_row(
                "SELECT id, title, content, type, is_template, template_variables, created_at, updated_at
                 FROM prompts WHERE id = ?1",
                [id],
                prompt_from_row,
            )
            .optional()?;
        match prompt {
            Some(mut prompt) => {
                prompt.tags = self.tags_for_prompt(id)?;
                Ok(Some(prompt))
            }
            None => Ok(None),
        }
    }

    pub fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.query_prompts(
            "SELECT id, title, content, type, is_template, template_variables, created_at, updated_at
             FROM prompts ORDER BY id",
        )
    }

    pub fn list_templates(&self) -> Result<Vec<Prompt>> {
        self.query_prompts(
            "SELECT id, title, content, type, is_template, template_variables, created_at, updated_at
             FROM prompts WHERE is_template = 1 ORDER BY id",
        )
    }

    fn query_prompts(&self, sql: &str) -> Result<Vec<Prompt>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], prompt_from_row)?;
        let mut prompts = Vec::new();
        for row in rows {
            let mut prompt = row?;
            prompt.tags = self.tags_for_prompt(prompt.id)?;
            prompts.push(prompt);
        }
        Ok(prompts)
    }

    /// Apply a partial update. `updated_at` is always bumped, even when
    /// no field changed.
    pub fn update_prompt(&self, id: i64, update: PromptUpdate) -> Result<Prompt> {
        let current = self.get_prompt(id)?.ok_or(StashError::PromptNotFound(id))?;

        let title = update.title.unwrap_or(current.title);
        let content = update.content.unwrap_or(current.content);
        let kind = update.kind.unwrap_or(current.kind);
        let is_template = update.is_template.unwrap_or(current.is_template);
        let template_variables = match update.template_variables {
            Some(value) => value,
            None => current.template_variables,
        };
        let vars_json = encode_variables(template_variables.as_ref())?;

        self.conn.execute(
            "UPDATE prompts
             SET title = ?1, content = ?2, type = ?3, is_template = ?4,
                 template_variables = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                title,
                content,
                kind.as_str(),
                is_template,
                vars_json,
                Utc::now().to_rfc3339(),
                id
            ],
        )?;

        if let Some(tag_ids) = update.tag_ids {
            self.replace_prompt_tags(id, &tag_ids)?;
        }

        self.get_prompt(id)?.ok_or(StashError::PromptNotFound(id))
    }

    /// Delete a prompt and its tag associations. Returns whether the
    /// prompt existed.
    pub fn delete_prompt(&self, id: i64) -> Result<bool> {
        self.conn
            .execute("DELETE FROM prompt_tags WHERE prompt_id = ?1", [id])?;
        let affected = self
            .conn
            .execute("DELETE FROM prompts WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    fn replace_prompt_tags(&self, prompt_id: i64, tag_ids: &[i64]) -> Result<()> {
        self.conn
            .execute("DELETE FROM prompt_tags WHERE prompt_id = ?1", [prompt_id])?;
        for tag_id in tag_ids {
            self.conn.execute(
                "INSERT OR IGNORE INTO prompt_tags (prompt_id, tag_id) VALUES (?1, ?2)",
                params![prompt_id, tag_id],
            )?;
        }
        Ok(())
    }

    fn tags_for_prompt(&self, prompt_id: i64) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.color, t.created_at
             FROM tags t
             JOIN prompt_tags pt ON pt.tag_id = t.id
             WHERE pt.prompt_id = ?1
             ORDER BY t.id",
        )?;
        let rows = stmt.query_map([prompt_id], tag_from_row)?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub fn create_component(&self, component: NewComponent) -> Result<PromptComponent> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO prompt_components (name, content, category, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                component.name,
                component.content,
                component.category,
                component.kind.as_str(),
                now.to_rfc3339()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "created component");
        Ok(PromptComponent {
            id,
            name: component.name,
            content: component.content,
            category: component.category,
            kind: component.kind,
            created_at: now,
        })
    }

    pub fn get_component(&self, id: i64) -> Result<Option<PromptComponent>> {
        let component = self
            .conn
            .query_row(
                "SELECT id, name, content, category, type, created_at
                 FROM prompt_components WHERE id = ?1",
                [id],
                component_from_row,
            )
            .optional()?;
        Ok(component)
    }

    pub fn list_components(&self) -> Result<Vec<PromptComponent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, content, category, type, created_at
             FROM prompt_components ORDER BY id",
        )?;
        let rows = stmt.query_map([], component_from_row)?;
        let mut components = Vec::new();
        for row in rows {
            components.push(row?);
        }
        Ok(components)
    }

    pub fn list_components_by_kind(&self, kind: PromptKind) -> Result<Vec<PromptComponent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, content, category, type, created_at
             FROM prompt_components WHERE type = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([kind.as_str()], component_from_row)?;
        let mut components = Vec::new();
        for row in rows {
            components.push(row?);
        }
        Ok(components)
    }

    pub fn update_component(&self, id: i64, update: ComponentUpdate) -> Result<PromptComponent> {
        let mut component = self
            .get_component(id)?
            .ok_or(StashError::ComponentNotFound(id))?;
        if let Some(name) = update.name {
            component.name = name;
        }
        if let Some(content) = update.content {
            component.content = content;
        }
        if let Some(category) = update.category {
            component.category = category;
        }
        if let Some(kind) = update.kind {
            component.kind = kind;
        }
        self.conn.execute(
            "UPDATE prompt_components SET name = ?1, content = ?2, category = ?3, type = ?4
             WHERE id = ?5",
            params![
                component.name,
                component.content,
                component.category,
                component.kind.as_str(),
                id
            ],
        )?;
        Ok(component)
    }

    /// Delete a component. Returns whether it existed.
    pub fn delete_component(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM prompt_components WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }
}

impl PromptSource for SqliteStore {
    fn find_prompt_by_id(&self, id: i64) -> Result<Option<Prompt>> {
        self.get_prompt(id)
    }

    fn find_components_by_ids(&self, ids: &[i64]) -> Result<Vec<PromptComponent>> {
        // One lookup per id so the caller's ordering is preserved;
        // unknown ids are skipped.
        let mut components = Vec::new();
        for id in ids {
            if let Some(component) = self.get_component(*id)? {
                components.push(component);
            }
        }
        Ok(components)
    }
}

fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
    let created_raw: String = row.get(3)?;
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: parse_datetime(3, &created_raw)?,
    })
}

fn prompt_from_row(row: &Row) -> rusqlite::Result<Prompt> {
    let kind_raw: String = row.get(3)?;
    let vars_raw: Option<String> = row.get(5)?;
    let created_raw: String = row.get(6)?;
    let updated_raw: String = row.get(7)?;

    let kind = kind_raw
        .parse::<PromptKind>()
        .map_err(|e| conversion_error(3, e.into()))?;
    let template_variables = match vars_raw {
        Some(raw) => {
            Some(serde_json::from_str(&raw).map_err(|e| conversion_error(5, Box::new(e)))?)
        }
        None => None,
    };

    Ok(Prompt {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        kind,
        is_template: row.get(4)?,
        template_variables,
        created_at: parse_datetime(6, &created_raw)?,
        updated_at: parse_datetime(7, &updated_raw)?,
        tags: Vec::new(),
    })
}

fn component_from_row(row: &Row) -> rusqlite::Result<PromptComponent> {
    let kind_raw: String = row.get(4)?;
    let created_raw: String = row.get(5)?;
    Ok(PromptComponent {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        kind: kind_raw
            .parse::<PromptKind>()
            .map_err(|e| conversion_error(4, e.into()))?,
        created_at: parse_datetime(5, &created_raw)?,
    })
}

fn encode_variables(variables: Option<&Vec<String>>) -> Result<Option<String>> {
    variables
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(StashError::from)
}

fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, Box::new(e)))
}

fn conversion_error(
    idx: usize,
    err: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteStore) {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::init(tmp.path()).unwrap();
        (tmp, store)
    }

    fn new_prompt(title: &str) -> NewPrompt {
        NewPrompt {
            title: title.to_string(),
            content: "content".to_string(),
            kind: PromptKind::Chatgpt,
            is_template: false,
            template_variables: None,
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        SqliteStore::init(tmp.path()).unwrap();
        assert!(matches!(
            SqliteStore::init(tmp.path()),
            Err(StashError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_without_init_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            SqliteStore::open(tmp.path()),
            Err(StashError::NotInitialized)
        ));
    }

    #[test]
    fn test_tag_crud() {
        let (_tmp, store) = open_store();

        let tag = store
            .create_tag(NewTag {
                name: "writing".to_string(),
                color: Some("#ff0000".to_string()),
            })
            .unwrap();
        assert_eq!(tag.id, 1);

        let updated = store
            .update_tag(
                tag.id,
                TagUpdate {
                    name: Some("copywriting".to_string()),
                    color: Some(None),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "copywriting");
        assert!(updated.color.is_none());

        assert_eq!(store.list_tags().unwrap().len(), 1);
        assert!(store.delete_tag(tag.id).unwrap());
        assert!(!store.delete_tag(tag.id).unwrap());
        assert!(store.list_tags().unwrap().is_empty());
    }

    #[test]
    fn test_prompt_round_trip_with_tags() {
        let (_tmp, store) = open_store();

        let tag = store
            .create_tag(NewTag {
                name: "art".to_string(),
                color: None,
            })
            .unwrap();

        let created = store
            .create_prompt(NewPrompt {
                title: "Portrait".to_string(),
                content: "A portrait of {{subject}}".to_string(),
                kind: PromptKind::Midjourney,
                is_template: true,
                template_variables: Some(vec!["subject".to_string()]),
                tag_ids: vec![tag.id],
            })
            .unwrap();

        let fetched = store.get_prompt(created.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Portrait");
        assert_eq!(fetched.kind, PromptKind::Midjourney);
        assert!(fetched.is_template);
        assert_eq!(
            fetched.template_variables,
            Some(vec!["subject".to_string()])
        );
        assert_eq!(fetched.tags.len(), 1);
        assert_eq!(fetched.tags[0].name, "art");
    }

    #[test]
    fn test_get_missing_prompt() {
        let (_tmp, store) = open_store();
        assert!(store.get_prompt(42).unwrap().is_none());
    }

    #[test]
    fn test_list_templates_filters() {
        let (_tmp, store) = open_store();

        store.create_prompt(new_prompt("plain")).unwrap();
        let mut template = new_prompt("template");
        template.is_template = true;
        store.create_prompt(template).unwrap();

        assert_eq!(store.list_prompts().unwrap().len(), 2);
        let templates = store.list_templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].title, "template");
    }

    #[test]
    fn test_update_prompt_partial() {
        let (_tmp, store) = open_store();
        let created = store.create_prompt(new_prompt("before")).unwrap();

        let updated = store
            .update_prompt(
                created.id,
                PromptUpdate {
                    title: Some("after".to_string()),
                    is_template: Some(true),
                    template_variables: Some(Some(vec!["x".to_string()])),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "after");
        assert_eq!(updated.content, "content");
        assert!(updated.is_template);
        assert_eq!(updated.template_variables, Some(vec!["x".to_string()]));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_prompt_replaces_tags() {
        let (_tmp, store) = open_store();
        let a = store
            .create_tag(NewTag {
                name: "a".to_string(),
                color: None,
            })
            .unwrap();
        let b = store
            .create_tag(NewTag {
                name: "b".to_string(),
                color: None,
            })
            .unwrap();

        let mut prompt = new_prompt("tagged");
        prompt.tag_ids = vec![a.id];
        let created = store.create_prompt(prompt).unwrap();
        assert_eq!(created.tags[0].name, "a");

        let updated = store
            .update_prompt(
                created.id,
                PromptUpdate {
                    tag_ids: Some(vec![b.id]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].name, "b");
    }

    #[test]
    fn test_update_missing_prompt_fails() {
        let (_tmp, store) = open_store();
        assert!(matches!(
            store.update_prompt(7, PromptUpdate::default()),
            Err(StashError::PromptNotFound(7))
        ));
    }

    #[test]
    fn test_delete_prompt() {
        let (_tmp, store) = open_store();
        let created = store.create_prompt(new_prompt("gone soon")).unwrap();
        assert!(store.delete_prompt(created.id).unwrap());
        assert!(!store.delete_prompt(created.id).unwrap());
        assert!(store.get_prompt(created.id).unwrap().is_none());
    }

    #[test]
    fn test_component_crud_and_kind_filter() {
        let (_tmp, store) = open_store();

        store
            .create_component(NewComponent {
                name: "tone".to_string(),
                content: "Be concise".to_string(),
                category: "style".to_string(),
                kind: PromptKind::Chatgpt,
            })
            .unwrap();
        let mj = store
            .create_component(NewComponent {
                name: "style".to_string(),
                content: "photorealistic".to_string(),
                category: "style".to_string(),
                kind: PromptKind::Midjourney,
            })
            .unwrap();

        assert_eq!(store.list_components().unwrap().len(), 2);
        let filtered = store.list_components_by_kind(PromptKind::Midjourney).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, mj.id);

        let updated = store
            .update_component(
                mj.id,
                ComponentUpdate {
                    content: Some("painterly".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.content, "painterly");

        assert!(store.delete_component(mj.id).unwrap());
        assert_eq!(store.list_components().unwrap().len(), 1);
    }

    #[test]
    fn test_find_components_preserves_requested_order() {
        let (_tmp, store) = open_store();
        let first = store
            .create_component(NewComponent {
                name: "one".to_string(),
                content: "one".to_string(),
                category: "misc".to_string(),
                kind: PromptKind::Chatgpt,
            })
            .unwrap();
        let second = store
            .create_component(NewComponent {
                name: "two".to_string(),
                content: "two".to_string(),
                category: "misc".to_string(),
                kind: PromptKind::Chatgpt,
            })
            .unwrap();

        let found = store
            .find_components_by_ids(&[second.id, 99, first.id])
            .unwrap();
        let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}

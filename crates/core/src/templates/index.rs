//! Persisted template index and the invocation commands derived from it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::definition::TemplateDefinition;

/// Id of the command that rebuilds the index.
pub const REBUILD_COMMAND_ID: &str = "rebuild-template-index";

#[derive(Debug, Error)]
pub enum TemplateIndexError {
    #[error("failed to read template index {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write template index {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template index {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("template not found: {0}")]
    NotFound(String),
}

/// The stored list of templates, replaced wholesale on every re-index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
}

/// A command that opens the form for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCommand {
    pub id: String,
    pub name: String,
}

impl TemplateIndex {
    pub fn new(templates: Vec<TemplateDefinition>) -> Self {
        Self { indexed_at: Some(Utc::now()), templates }
    }

    /// Load the index; a missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self, TemplateIndexError> {
        if !path.exists() {
            debug!(path = %path.display(), "no template index yet");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .map_err(|source| TemplateIndexError::Read { path: path.to_path_buf(), source })?;

        serde_json::from_str(&text)
            .map_err(|source| TemplateIndexError::Corrupt { path: path.to_path_buf(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), TemplateIndexError> {
        let write_err =
            |source| TemplateIndexError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let text = serde_json::to_string_pretty(self).map_err(|source| {
            TemplateIndexError::Corrupt { path: path.to_path_buf(), source }
        })?;
        fs::write(path, text).map_err(write_err)
    }

    /// One command per template, numbered in index order.
    pub fn commands(&self) -> Vec<TemplateCommand> {
        self.templates
            .iter()
            .enumerate()
            .map(|(i, t)| TemplateCommand { id: command_id(i), name: t.name.clone() })
            .collect()
    }

    /// Find a template by display name, command id or source path.
    pub fn find(&self, key: &str) -> Result<&TemplateDefinition, TemplateIndexError> {
        let key_path = Path::new(key);
        self.templates
            .iter()
            .enumerate()
            .find(|(i, t)| t.name == key || command_id(*i) == key || t.source == key_path)
            .map(|(_, t)| t)
            .ok_or_else(|| TemplateIndexError::NotFound(key.to_string()))
    }
}

fn command_id(index: usize) -> String {
    format!("use-template-{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    fn template(name: &str, source: &str) -> TemplateDefinition {
        TemplateDefinition {
            name: name.into(),
            source: PathBuf::from(source),
            body_envelope: codec::encode("body"),
            file_name_rule: None,
            file_location_rule: None,
            fields: vec![],
        }
    }

    fn index() -> TemplateIndex {
        TemplateIndex::new(vec![
            template("daily", "daily.md"),
            template("work -> meeting", "work/meeting.md"),
        ])
    }

    #[test]
    fn commands_are_numbered() {
        let cmds = index().commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[1].id, "use-template-1");
        assert_eq!(cmds[1].name, "work -> meeting");
    }

    #[test]
    fn find_by_name_command_or_path() {
        let idx = index();
        assert_eq!(idx.find("daily").unwrap().name, "daily");
        assert_eq!(idx.find("use-template-1").unwrap().name, "work -> meeting");
        assert_eq!(idx.find("work/meeting.md").unwrap().name, "work -> meeting");
        assert!(matches!(idx.find("nope"), Err(TemplateIndexError::NotFound(_))));
    }

    #[test]
    fn missing_file_is_empty_index() {
        let tmp = tempfile::tempdir().unwrap();
        let idx = TemplateIndex::load(&tmp.path().join("none.json")).unwrap();
        assert!(idx.templates.is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("templates.json");
        let idx = index();
        idx.save(&path).unwrap();
        assert_eq!(TemplateIndex::load(&path).unwrap(), idx);
    }

    #[test]
    fn corrupt_file_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("templates.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TemplateIndex::load(&path),
            Err(TemplateIndexError::Corrupt { .. })
        ));
    }
}

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Frontmatter property that holds the form schema unless a profile overrides it.
pub const DEFAULT_TEMPLATE_PROPERTY: &str = "note-from-form";

/// Extension used for created notes unless a profile overrides it.
pub const DEFAULT_NOTE_EXTENSION: &str = "md";

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scripting: ScriptingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    pub templates_dir: String,
    /// Default output location, relative to `vault_root`.
    #[serde(default)]
    pub output_dir: String,
    /// Frontmatter key that carries the form schema.
    pub template_property: Option<String>,
    /// Extension (without dot) of created notes.
    pub note_extension: Option<String>,
    /// Where the template index is persisted.
    /// Defaults to `{{vault_root}}/.mdform/templates.json`.
    pub index_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Limits applied to the Lua sandbox that runs `f:` rules.
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptingConfig {
    /// Maximum memory the Lua VM can allocate (in bytes). 0 = unlimited.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self { memory_limit: default_memory_limit() }
    }
}

fn default_memory_limit() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    pub templates_dir: PathBuf,
    /// Vault-relative default output location for new notes.
    pub output_dir: String,
    pub template_property: String,
    pub note_extension: String,
    pub index_path: PathBuf,
    pub logging: LoggingConfig,
    pub scripting: ScriptingConfig,
}

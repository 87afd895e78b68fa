//! Errors raised while turning a template document into a definition.

use std::path::PathBuf;

use thiserror::Error;

/// The document's schema is missing or structurally malformed.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("frontmatter has no '{0}' property")]
    MissingProperty(String),

    #[error("'{property}' must hold a JSON object starting with '{{'")]
    NotAnObject { property: String },

    #[error("'{property}' value is not closed: unbalanced braces or quotes")]
    Unbalanced { property: String },

    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("'form-items' are missing")]
    MissingFormItems,
}

/// A schema entry failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("failed to parse 'form-items' element {index}: 'id' is missing, null, or empty")]
    MissingId { index: usize },

    #[error("failed to parse 'form-items' element {index}: 'type' is missing")]
    MissingKind { index: usize },

    #[error("failed to parse 'form-items' element {index}: '{kind}' is not supported item type")]
    UnknownKind { index: usize, kind: String },

    #[error("failed to parse 'form-items' element {index}: duplicate id '{id}'")]
    DuplicateId { index: usize, id: String },

    #[error("failed to parse 'form-items' element {index}: id '{id}' is reserved")]
    ReservedId { index: usize, id: String },

    #[error("failed to parse '{path}': expected '<mode>:<payload>', got '{raw}'")]
    MalformedRule { path: String, raw: String },

    #[error("failed to parse '{path}': unsupported {tag}:")]
    UnsupportedMode { path: String, tag: char },
}

/// Why a single document did not produce a template.
#[derive(Debug, Error)]
pub enum TemplateParseError {
    #[error(transparent)]
    Schema(#[from] SchemaParseError),

    #[error(transparent)]
    Field(#[from] FieldValidationError),
}

/// Fatal errors of a discovery run.
#[derive(Debug, Error)]
pub enum TemplateDiscoveryError {
    #[error("templates directory does not exist: {0}")]
    MissingDir(String),
}

/// Per-document failure collected during discovery.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read templates folder {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse template '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: TemplateParseError,
    },
}

impl DocumentError {
    pub fn path(&self) -> &PathBuf {
        match self {
            DocumentError::Io { path, .. }
            | DocumentError::Walk { path, .. }
            | DocumentError::Parse { path, .. } => path,
        }
    }
}

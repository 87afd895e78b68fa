//! Final rendering of a template against a resolved view model.
//!
//! Performs no I/O: callers decide where and whether to write the result.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::codec::DecodeError;

use super::definition::{FILE_LOCATION_ID, FILE_NAME_ID, TemplateDefinition};
use super::engine::{RenderContext, TemplateRenderError, TemplateRenderer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode body of template '{template}': {source}")]
    Decode {
        template: String,
        #[source]
        source: DecodeError,
    },

    #[error("failed to render template '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: TemplateRenderError,
    },

    #[error("template '{0}' resolved to an empty file name")]
    EmptyFileName(String),
}

/// A rendered document and the vault-relative path it should be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub text: String,
    /// `location/fileName.ext`; just `fileName.ext` for an empty location.
    pub output_path: PathBuf,
}

/// Decode the template body and render it with the view model.
///
/// `view` must contain the resolved `fileName` and `fileLocation` entries;
/// they are visible to the body like any other binding.
pub fn render_document(
    template: &TemplateDefinition,
    view: &RenderContext,
    renderer: &dyn TemplateRenderer,
    extension: &str,
) -> Result<RenderedDocument, RenderError> {
    let body = template
        .body()
        .map_err(|source| RenderError::Decode { template: template.name.clone(), source })?;

    let text = renderer
        .render(&body, view)
        .map_err(|source| RenderError::Render { template: template.name.clone(), source })?;

    let file_name = view.get(FILE_NAME_ID).map(String::as_str).unwrap_or_default();
    if file_name.trim().is_empty() {
        return Err(RenderError::EmptyFileName(template.name.clone()));
    }
    let location = view.get(FILE_LOCATION_ID).map(String::as_str).unwrap_or_default();

    let file = if extension.is_empty() {
        file_name.to_string()
    } else {
        format!("{file_name}.{extension}")
    };
    let output_path = if location.is_empty() {
        PathBuf::from(file)
    } else {
        PathBuf::from(location).join(file)
    };

    debug!(template = %template.name, path = %output_path.display(), "rendered document");
    Ok(RenderedDocument { text, output_path })
}

const ILLEGAL_PATH_CHARS: &[char] = &['*', '"', '<', '>', ':', '|', '?'];

fn is_illegal(c: char) -> bool {
    ILLEGAL_PATH_CHARS.contains(&c) || c.is_control()
}

/// Strip characters that cannot appear in a file name, separators included.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_illegal(*c) && *c != '/' && *c != '\\')
        .map(normalize_space)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Strip illegal characters from a folder path and normalize its separators.
///
/// `\` becomes `/`, repeated separators collapse and leading or trailing
/// separators are removed, so the result is always vault-relative.
pub fn sanitize_location(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !is_illegal(*c))
        .map(|c| if c == '\\' { '/' } else { normalize_space(c) })
        .collect();

    cleaned
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_space(c: char) -> char {
    if c == '\u{00A0}' || c == '\u{202F}' { ' ' } else { c }
}

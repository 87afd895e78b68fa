//! Template document parsing.
//!
//! A template document is a markdown file whose frontmatter holds a JSON form
//! schema under a configurable property:
//!
//! ```markdown
//! ---
//! tags: [meeting]
//! note-from-form: {
//!   "file-name": "t:{{date}} {{title}}",
//!   "form-items": [
//!     { "id": "title", "type": "text", "form": { "title": "Title" } },
//!     { "id": "date", "type": "date", "init": "v:today" }
//!   ]
//! }
//! ---
//! # {{title}}
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::codec;
use crate::frontmatter::{extract_object_property, split};

use super::definition::{
    FieldKind, FieldSpec, FormDisplay, RuleSlot, TemplateDefinition, ValueRule,
    is_reserved_id,
};
use super::errors::{FieldValidationError, SchemaParseError, TemplateParseError};

#[derive(Debug, Deserialize)]
struct SchemaInput {
    #[serde(rename = "file-name")]
    file_name: Option<String>,
    #[serde(rename = "file-location")]
    file_location: Option<String>,
    #[serde(rename = "form-items")]
    form_items: Option<Vec<FormItemInput>>,
}

#[derive(Debug, Deserialize)]
struct FormItemInput {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    init: Option<String>,
    get: Option<String>,
    form: Option<FormDisplay>,
}

/// The validated content of a schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSchema {
    pub file_name_rule: Option<ValueRule>,
    pub file_location_rule: Option<ValueRule>,
    pub fields: Vec<FieldSpec>,
}

/// Turns template documents into [`TemplateDefinition`]s.
#[derive(Debug, Clone)]
pub struct SchemaParser {
    property: String,
}

impl SchemaParser {
    /// `property` is the frontmatter key holding the schema.
    pub fn new(property: impl Into<String>) -> Self {
        Self { property: property.into() }
    }

    /// Parse one document.
    ///
    /// Returns `Ok(None)` when the document has no frontmatter block at all;
    /// such files are not templates and are skipped by discovery.
    pub fn parse_document(
        &self,
        name: &str,
        source: &Path,
        content: &str,
    ) -> Result<Option<TemplateDefinition>, TemplateParseError> {
        let Some(doc) = split(content) else {
            return Ok(None);
        };

        let block = extract_object_property(doc.yaml, &self.property)?;
        let schema = self.parse_schema(&block.value)?;

        let stored = if block.remainder.trim().is_empty() {
            doc.body.to_string()
        } else {
            let mut props = block.remainder;
            if !props.ends_with('\n') {
                props.push('\n');
            }
            format!("---\n{props}---\n{}", doc.body)
        };

        debug!(template = name, fields = schema.fields.len(), "parsed template schema");

        Ok(Some(TemplateDefinition {
            name: name.to_string(),
            source: source.to_path_buf(),
            body_envelope: codec::encode(&stored),
            file_name_rule: schema.file_name_rule,
            file_location_rule: schema.file_location_rule,
            fields: schema.fields,
        }))
    }

    /// Parse and validate the JSON schema text.
    pub fn parse_schema(&self, json: &str) -> Result<ParsedSchema, TemplateParseError> {
        let input: SchemaInput =
            serde_json::from_str(json).map_err(SchemaParseError::InvalidJson)?;

        let file_name_rule = parse_rule(input.file_name.as_deref(), RuleSlot::Get, "file-name")?;
        let file_location_rule =
            parse_rule(input.file_location.as_deref(), RuleSlot::Get, "file-location")?;

        let items = input.form_items.ok_or(SchemaParseError::MissingFormItems)?;
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let field = parse_field(index, item)?;
            if is_reserved_id(&field.id) {
                return Err(FieldValidationError::ReservedId { index, id: field.id }.into());
            }
            if !seen.insert(field.id.clone()) {
                return Err(FieldValidationError::DuplicateId { index, id: field.id }.into());
            }
            fields.push(field);
        }

        Ok(ParsedSchema { file_name_rule, file_location_rule, fields })
    }
}

fn parse_field(index: usize, item: FormItemInput) -> Result<FieldSpec, FieldValidationError> {
    let id = item
        .id
        .filter(|id| !id.is_empty())
        .ok_or(FieldValidationError::MissingId { index })?;

    let kind_name = item
        .kind
        .filter(|k| !k.is_empty())
        .ok_or(FieldValidationError::MissingKind { index })?;
    let kind = FieldKind::from_schema_name(&kind_name)
        .ok_or(FieldValidationError::UnknownKind { index, kind: kind_name })?;

    let init_rule = parse_rule(
        item.init.as_deref(),
        RuleSlot::Init,
        &format!("form-items[{index}].init"),
    )?;
    let get_rule = parse_rule(
        item.get.as_deref(),
        RuleSlot::Get,
        &format!("form-items[{index}].get"),
    )?;

    Ok(FieldSpec { id, kind, init_rule, get_rule, display: item.form })
}

/// Parse `<tag>:<payload>`. Absent or empty strings mean "no rule".
fn parse_rule(
    raw: Option<&str>,
    slot: RuleSlot,
    path: &str,
) -> Result<Option<ValueRule>, FieldValidationError> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    let mut chars = raw.chars();
    let (Some(tag), Some(':')) = (chars.next(), chars.next()) else {
        return Err(FieldValidationError::MalformedRule {
            path: path.to_string(),
            raw: raw.to_string(),
        });
    };

    ValueRule::from_tag(tag, chars.as_str(), slot)
        .map(Some)
        .ok_or(FieldValidationError::UnsupportedMode { path: path.to_string(), tag })
}

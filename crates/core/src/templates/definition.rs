//! Parsed, validated template definitions.
//!
//! A [`TemplateDefinition`] is what the index stores for every template
//! document: the encoded body, the output path rules and the ordered list of
//! field specifications.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeError};
use crate::dates::TemporalKind;

/// Reserved id of the output file name item.
pub const FILE_NAME_ID: &str = "fileName";

/// Reserved id of the output location item.
pub const FILE_LOCATION_ID: &str = "fileLocation";

/// Returns true for ids that belong to the output path items.
pub fn is_reserved_id(id: &str) -> bool {
    id == FILE_NAME_ID || id == FILE_LOCATION_ID
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    /// Display name, prefixed with `"<folder> -> "` per nesting level.
    pub name: String,
    /// Source path relative to the templates folder.
    pub source: PathBuf,
    /// Frontmatter (minus the schema property) plus body, see [`crate::codec`].
    pub body_envelope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_rule: Option<ValueRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_location_rule: Option<ValueRule>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl TemplateDefinition {
    /// Decode the stored document text.
    pub fn body(&self) -> Result<String, DecodeError> {
        codec::decode(&self.body_envelope)
    }
}

/// One entry of the schema's `form-items` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_rule: Option<ValueRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_rule: Option<ValueRule>,
    /// Absent for headless fields: resolved but never shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<FormDisplay>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDisplay {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FormDisplay {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), description: None, placeholder: None }
    }
}

/// Closed set of field kinds a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Date,
    Time,
    DateTime,
    Choice,
    MultiChoice,
    Boolean,
}

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Text,
        FieldKind::TextArea,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Time,
        FieldKind::DateTime,
        FieldKind::Choice,
        FieldKind::MultiChoice,
        FieldKind::Boolean,
    ];

    /// Resolve a schema `type` string. Drop-down and check-box names are
    /// accepted as aliases.
    pub fn from_schema_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(FieldKind::Text),
            "textArea" => Some(FieldKind::TextArea),
            "number" => Some(FieldKind::Number),
            "date" => Some(FieldKind::Date),
            "time" => Some(FieldKind::Time),
            "dateTime" => Some(FieldKind::DateTime),
            "choice" | "dropDown" => Some(FieldKind::Choice),
            "multiChoice" | "dropDownMulti" => Some(FieldKind::MultiChoice),
            "boolean" | "checkBox" => Some(FieldKind::Boolean),
            _ => None,
        }
    }

    pub fn schema_name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::TextArea => "textArea",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::DateTime => "dateTime",
            FieldKind::Choice => "choice",
            FieldKind::MultiChoice => "multiChoice",
            FieldKind::Boolean => "boolean",
        }
    }

    pub fn temporal(self) -> Option<TemporalKind> {
        match self {
            FieldKind::Date => Some(TemporalKind::Date),
            FieldKind::Time => Some(TemporalKind::Time),
            FieldKind::DateTime => Some(TemporalKind::DateTime),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}

/// How a value is computed: `v:`, `f:` or `t:` in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "text", rename_all = "camelCase")]
pub enum ValueRule {
    /// `v:<text>`: used verbatim (get) or parsed per field kind (init).
    Literal(String),
    /// `f:<code>`: a Lua snippet run by the expression sandbox.
    Expression(String),
    /// `t:<text>`: rendered against the bindings; a date pattern for date kinds.
    Template(String),
}

/// Which side of a field a rule controls. Init rules cannot be templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSlot {
    Init,
    Get,
}

impl ValueRule {
    pub fn tag(&self) -> char {
        match self {
            ValueRule::Literal(_) => 'v',
            ValueRule::Expression(_) => 'f',
            ValueRule::Template(_) => 't',
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            ValueRule::Literal(s) | ValueRule::Expression(s) | ValueRule::Template(s) => s,
        }
    }

    /// Build a rule from its single-character mode tag, if the slot allows it.
    pub fn from_tag(tag: char, payload: &str, slot: RuleSlot) -> Option<Self> {
        match (tag, slot) {
            ('v', _) => Some(ValueRule::Literal(payload.to_string())),
            ('f', _) => Some(ValueRule::Expression(payload.to_string())),
            ('t', RuleSlot::Get) => Some(ValueRule::Template(payload.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ValueRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag(), self.payload())
    }
}

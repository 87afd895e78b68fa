//! Typed current values of form items and their text renderings.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::scripting::Bindings;
use crate::templates::engine::RenderContext;

/// Separator between the labels of a multi-choice value.
pub const CHOICE_SEPARATOR: &str = ", ";

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    #[serde(rename = "k")]
    pub key: String,
    #[serde(rename = "v")]
    pub label: String,
}

/// Schema form of an option: `{"k": key, "v": label, "s": selected}`.
#[derive(Debug, Deserialize)]
struct ChoiceInput {
    k: String,
    v: String,
    #[serde(default)]
    s: bool,
}

/// The current value of a form item.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Choice { options: Vec<ChoiceOption>, selected: Vec<usize> },
}

impl FieldValue {
    /// Labels of the selected options, in option order.
    pub fn selected_labels(&self) -> Vec<&str> {
        match self {
            FieldValue::Choice { options, selected } => {
                selected.iter().filter_map(|i| options.get(*i)).map(|o| o.label.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn selected_keys(&self) -> Vec<&str> {
        match self {
            FieldValue::Choice { options, selected } => {
                selected.iter().filter_map(|i| options.get(*i)).map(|o| o.key.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Parsed option list plus the indexes flagged as selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    pub options: Vec<ChoiceOption>,
    pub flagged: Vec<usize>,
}

/// Parse `[{"k","v","s"?}, ...]`. An empty list is an error.
pub fn parse_choice_list(value: Value) -> Result<ChoiceList, String> {
    let inputs: Vec<ChoiceInput> = serde_json::from_value(value)
        .map_err(|e| format!("expected a list of {{\"k\", \"v\", \"s\"?}} options: {e}"))?;
    if inputs.is_empty() {
        return Err("option list can't be empty".to_string());
    }

    let flagged = inputs.iter().enumerate().filter(|(_, o)| o.s).map(|(i, _)| i).collect();
    let options = inputs.into_iter().map(|o| ChoiceOption { key: o.k, label: o.v }).collect();
    Ok(ChoiceList { options, flagged })
}

/// Render a number the way scripts expect: `3` rather than `3.0`.
pub fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    n.to_string()
}

/// JSON form of a number, integral values as integers.
pub fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Text of a binding as seen by `{{var}}` templates.
///
/// Option lists render their labels joined by [`CHOICE_SEPARATOR`].
pub fn binding_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => obj.get("v").map(binding_to_string).unwrap_or_default(),
                other => binding_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(CHOICE_SEPARATOR),
        Value::Object(_) => value.to_string(),
    }
}

/// Flatten bindings into the string map used by the renderer.
pub fn bindings_to_context(bindings: &Bindings) -> RenderContext {
    bindings.iter().map(|(k, v)| (k.clone(), binding_to_string(v))).collect()
}

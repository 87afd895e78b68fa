//! Runtime form items: one per schema field plus the two output path items.

use serde_json::{Map, Value};
use tracing::debug;

use crate::dates::{self, TemporalKind};
use crate::scripting::{Bindings, ExpressionEvaluator};
use crate::templates::definition::{
    FILE_LOCATION_ID, FILE_NAME_ID, FieldKind, FieldSpec, FormDisplay, ValueRule,
};
use crate::templates::engine::{TemplateRenderer, has_placeholder};
use crate::templates::pipeline::{sanitize_file_name, sanitize_location};

use super::errors::{EvalPhase, ExpressionEvaluationError, FormError, ValueParseError};
use super::value::{
    CHOICE_SEPARATOR, ChoiceOption, FieldValue, binding_to_string, bindings_to_context,
    format_number, number_to_json, parse_choice_list,
};

/// What an item contributes to: the note body or the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRole {
    Field,
    FileName,
    FileLocation,
}

/// A value relayed back from the host for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditValue {
    /// Typed text, parsed per item kind.
    Text(String),
    /// Toggle state of a boolean item.
    Flag(bool),
    /// Option keys of a choice item.
    Selection(Vec<String>),
}

/// Everything a host needs to draw one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSpec {
    pub id: String,
    pub kind: FieldKind,
    pub title: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    /// Current value in its default text form.
    pub value: String,
    /// Options of choice items, empty otherwise.
    pub options: Vec<ChoiceOption>,
    /// Keys of the currently selected options.
    pub selected: Vec<String>,
}

/// Collaborators used while resolving get rules.
#[derive(Clone, Copy)]
pub struct ResolveEnv<'a> {
    pub evaluator: &'a dyn ExpressionEvaluator,
    pub renderer: &'a dyn TemplateRenderer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormItem {
    id: String,
    kind: FieldKind,
    role: ItemRole,
    display: Option<FormDisplay>,
    get_rule: Option<ValueRule>,
    value: FieldValue,
}

impl FormItem {
    /// Build an ordinary item, computing its initial value.
    pub fn from_spec(
        spec: &FieldSpec,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Self, FormError> {
        let value = initial_value(spec, evaluator)?;
        debug!(id = %spec.id, kind = %spec.kind, "initialised form item");
        Ok(Self {
            id: spec.id.clone(),
            kind: spec.kind,
            role: ItemRole::Field,
            display: spec.display.clone(),
            get_rule: spec.get_rule.clone(),
            value,
        })
    }

    /// Output file name item. Shown to the user only when no rule computes it.
    pub fn file_name(rule: Option<&ValueRule>) -> Self {
        Self::path_item(FILE_NAME_ID, "File Name", ItemRole::FileName, rule)
    }

    /// Output location item. Without a rule it falls back to `default_dir`
    /// and stays hidden.
    pub fn file_location(rule: Option<&ValueRule>, default_dir: &str) -> Self {
        let fallback = ValueRule::Literal(default_dir.to_string());
        Self::path_item(
            FILE_LOCATION_ID,
            "File Location",
            ItemRole::FileLocation,
            Some(rule.unwrap_or(&fallback)),
        )
    }

    fn path_item(id: &str, title: &str, role: ItemRole, rule: Option<&ValueRule>) -> Self {
        Self {
            id: id.to_string(),
            kind: FieldKind::Text,
            role,
            display: rule.is_none().then(|| FormDisplay::titled(title)),
            get_rule: rule.cloned(),
            value: FieldValue::Text(String::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn role(&self) -> ItemRole {
        self.role
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn display(&self) -> Option<&FormDisplay> {
        self.display.as_ref()
    }

    pub fn is_path_item(&self) -> bool {
        self.role != ItemRole::Field
    }

    /// Value exposed to get rules before resolution.
    pub fn raw_binding(&self) -> Value {
        match &self.value {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Timestamp(_) => Value::String(self.default_format()),
            FieldValue::Choice { options, selected } => Value::Array(
                selected
                    .iter()
                    .filter_map(|i| options.get(*i))
                    .map(|o| {
                        let mut obj = Map::new();
                        obj.insert("k".into(), Value::String(o.key.clone()));
                        obj.insert("v".into(), Value::String(o.label.clone()));
                        Value::Object(obj)
                    })
                    .collect(),
            ),
        }
    }

    /// The kind's built-in text form of the current value.
    pub fn default_format(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Timestamp(ts) => dates::format_default(self.temporal_kind(), ts),
            FieldValue::Choice { .. } => self.value.selected_labels().join(CHOICE_SEPARATOR),
        }
    }

    fn temporal_kind(&self) -> TemporalKind {
        self.kind.temporal().unwrap_or(TemporalKind::DateTime)
    }

    /// Compute this item's entry in the view model.
    pub fn resolve_get(&self, view: &Bindings, env: ResolveEnv<'_>) -> Result<String, FormError> {
        let text = match &self.get_rule {
            None => self.default_format(),
            Some(ValueRule::Literal(text)) => text.clone(),
            Some(ValueRule::Expression(code)) => {
                env.evaluator.eval_get(code, view).map_err(|e| ExpressionEvaluationError {
                    id: self.id.clone(),
                    phase: EvalPhase::Get,
                    message: e.to_string(),
                })?
            }
            Some(ValueRule::Template(text)) => match &self.value {
                FieldValue::Timestamp(ts) if !has_placeholder(text) => {
                    dates::format_pattern(ts, text)
                        .map_err(|source| FormError::Format { id: self.id.clone(), source })?
                }
                _ => env
                    .renderer
                    .render(text, &bindings_to_context(view))
                    .map_err(|source| FormError::Render { id: self.id.clone(), source })?,
            },
        };

        Ok(match self.role {
            ItemRole::Field => text,
            ItemRole::FileName => sanitize_file_name(&text),
            ItemRole::FileLocation => sanitize_location(&text),
        })
    }

    /// Descriptor for the host, `None` for headless items.
    pub fn widget(&self) -> Option<WidgetSpec> {
        let display = self.display.as_ref()?;
        let (options, selected) = match &self.value {
            FieldValue::Choice { options, .. } => (
                options.clone(),
                self.value.selected_keys().into_iter().map(String::from).collect(),
            ),
            _ => (Vec::new(), Vec::new()),
        };
        Some(WidgetSpec {
            id: self.id.clone(),
            kind: self.kind,
            title: display.title.clone(),
            description: display.description.clone(),
            placeholder: display.placeholder.clone(),
            value: self.default_format(),
            options,
            selected,
        })
    }

    /// Replace the current value with an edit from the host.
    pub fn apply_edit(&mut self, edit: EditValue) -> Result<(), FormError> {
        if self.display.is_none() {
            return Err(FormError::invalid_edit(&self.id, "field is not editable"));
        }

        let id = self.id.as_str();
        let new_value = match (&self.value, edit) {
            (FieldValue::Text(_), EditValue::Text(s)) => FieldValue::Text(s),
            (FieldValue::Number(_), EditValue::Text(s)) => {
                let n = s
                    .trim()
                    .parse()
                    .map_err(|_| FormError::invalid_edit(id, format!("'{s}' is not a number")))?;
                FieldValue::Number(n)
            }
            (FieldValue::Boolean(_), EditValue::Flag(b)) => FieldValue::Boolean(b),
            (FieldValue::Boolean(_), EditValue::Text(s)) => {
                FieldValue::Boolean(parse_flag(&s).map_err(|m| FormError::invalid_edit(id, m))?)
            }
            (FieldValue::Timestamp(_), EditValue::Text(s)) => FieldValue::Timestamp(
                dates::parse_value(&s).map_err(|e| FormError::invalid_edit(id, e))?,
            ),
            (FieldValue::Choice { options, .. }, EditValue::Text(s)) => {
                let keys = if self.kind == FieldKind::MultiChoice {
                    s.split(',').map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect()
                } else {
                    vec![s.trim().to_string()]
                };
                self.select(options, keys)?
            }
            (FieldValue::Choice { options, .. }, EditValue::Selection(keys)) => {
                self.select(options, keys)?
            }
            (_, edit) => {
                return Err(FormError::invalid_edit(
                    id,
                    format!("{edit:?} does not fit a {} field", self.kind),
                ));
            }
        };

        self.value = new_value;
        Ok(())
    }

    fn select(&self, options: &[ChoiceOption], keys: Vec<String>) -> Result<FieldValue, FormError> {
        if self.kind == FieldKind::Choice && keys.len() != 1 {
            return Err(FormError::invalid_edit(&self.id, "exactly one option must be selected"));
        }

        let mut selected = Vec::with_capacity(keys.len());
        for key in &keys {
            let index = options.iter().position(|o| &o.key == key).ok_or_else(|| {
                FormError::invalid_edit(&self.id, format!("unknown option '{key}'"))
            })?;
            if !selected.contains(&index) {
                selected.push(index);
            }
        }
        selected.sort_unstable();

        Ok(FieldValue::Choice { options: options.to_vec(), selected })
    }
}

fn parse_flag(text: &str) -> Result<bool, String> {
    match text.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("'{other}' is not true or false")),
    }
}

fn initial_value(
    spec: &FieldSpec,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<FieldValue, FormError> {
    let id = spec.id.as_str();
    let parse_err = |message: String| ValueParseError::new(id, message);

    let source = match &spec.init_rule {
        None => return default_value(spec),
        Some(ValueRule::Literal(text)) => InitSource::Literal(text),
        Some(ValueRule::Expression(code)) => {
            InitSource::Computed(evaluator.eval_init(code).map_err(|e| {
                ExpressionEvaluationError {
                    id: id.to_string(),
                    phase: EvalPhase::Init,
                    message: e.to_string(),
                }
            })?)
        }
        Some(rule @ ValueRule::Template(_)) => {
            return Err(parse_err(format!("init does not support '{}:'", rule.tag())).into());
        }
    };

    let value = match spec.kind {
        FieldKind::Text | FieldKind::TextArea => match source {
            InitSource::Literal(text) => FieldValue::Text(text.to_string()),
            InitSource::Computed(Value::String(s)) => FieldValue::Text(s),
            InitSource::Computed(Value::Null) => FieldValue::Text(String::new()),
            InitSource::Computed(v @ (Value::Number(_) | Value::Bool(_))) => {
                FieldValue::Text(binding_to_string(&v))
            }
            InitSource::Computed(other) => {
                return Err(parse_err(format!("expected text, got {other}")).into());
            }
        },
        FieldKind::Number => match source {
            InitSource::Literal(text) => FieldValue::Number(
                text.trim().parse().map_err(|_| parse_err(format!("'{text}' is not a number")))?,
            ),
            InitSource::Computed(Value::Number(n)) => FieldValue::Number(
                n.as_f64().ok_or_else(|| parse_err(format!("{n} is out of range")))?,
            ),
            InitSource::Computed(Value::String(s)) => FieldValue::Number(
                s.trim().parse().map_err(|_| parse_err(format!("'{s}' is not a number")))?,
            ),
            InitSource::Computed(other) => {
                return Err(parse_err(format!("expected a number, got {other}")).into());
            }
        },
        FieldKind::Boolean => match source {
            InitSource::Literal(text) => FieldValue::Boolean(parse_flag(text).map_err(parse_err)?),
            InitSource::Computed(Value::Bool(b)) => FieldValue::Boolean(b),
            InitSource::Computed(other) => {
                return Err(parse_err(format!("expected a boolean, got {other}")).into());
            }
        },
        FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
            let parsed = match source {
                InitSource::Literal(text) => dates::parse_value(text),
                InitSource::Computed(Value::String(s)) => dates::parse_value(&s),
                InitSource::Computed(Value::Number(n)) => {
                    dates::from_unix_seconds(n.as_f64().unwrap_or(f64::NAN))
                }
                InitSource::Computed(other) => {
                    let message = format!("expected a date string or Unix seconds, got {other}");
                    return Err(parse_err(message).into());
                }
            };
            FieldValue::Timestamp(parsed.map_err(|e| parse_err(e.to_string()))?)
        }
        FieldKind::Choice | FieldKind::MultiChoice => {
            let json = match source {
                InitSource::Literal(text) => serde_json::from_str(text)
                    .map_err(|e| parse_err(format!("option list is not valid JSON: {e}")))?,
                InitSource::Computed(v) => v,
            };
            let list = parse_choice_list(json).map_err(parse_err)?;
            let selected = if spec.kind == FieldKind::Choice {
                vec![list.flagged.first().copied().unwrap_or(0)]
            } else {
                list.flagged
            };
            FieldValue::Choice { options: list.options, selected }
        }
    };

    Ok(value)
}

enum InitSource<'a> {
    Literal(&'a str),
    Computed(Value),
}

fn default_value(spec: &FieldSpec) -> Result<FieldValue, FormError> {
    Ok(match spec.kind {
        FieldKind::Text | FieldKind::TextArea => FieldValue::Text(String::new()),
        FieldKind::Number => FieldValue::Number(0.0),
        FieldKind::Boolean => FieldValue::Boolean(false),
        FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
            FieldValue::Timestamp(dates::now())
        }
        FieldKind::Choice | FieldKind::MultiChoice => {
            return Err(ValueParseError::new(
                &spec.id,
                format!("'{}' items need an init option list", spec.kind),
            )
            .into());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::LuaEngine;
    use crate::templates::engine::PlaceholderRenderer;
    use chrono::NaiveDateTime;
    use serde_json::json;

    fn spec(
        id: &str,
        kind: FieldKind,
        init: Option<ValueRule>,
        get: Option<ValueRule>,
    ) -> FieldSpec {
        FieldSpec {
            id: id.into(),
            kind,
            init_rule: init,
            get_rule: get,
            display: Some(FormDisplay::titled(id)),
        }
    }

    fn lit(s: &str) -> Option<ValueRule> {
        Some(ValueRule::Literal(s.into()))
    }

    fn build(spec: &FieldSpec) -> Result<FormItem, FormError> {
        FormItem::from_spec(spec, &LuaEngine::sandboxed().unwrap())
    }

    fn resolve(item: &FormItem, view: &Bindings) -> Result<String, FormError> {
        let lua = LuaEngine::sandboxed().unwrap();
        item.resolve_get(view, ResolveEnv { evaluator: &lua, renderer: &PlaceholderRenderer })
    }

    #[test]
    fn defaults_per_kind() {
        assert_eq!(build(&spec("t", FieldKind::Text, None, None)).unwrap().default_format(), "");
        assert_eq!(build(&spec("n", FieldKind::Number, None, None)).unwrap().default_format(), "0");
        assert_eq!(
            build(&spec("b", FieldKind::Boolean, None, None)).unwrap().default_format(),
            "false"
        );
        let date = build(&spec("d", FieldKind::Date, None, None)).unwrap();
        assert!(matches!(date.value(), FieldValue::Timestamp(_)));
    }

    #[test]
    fn literal_init_is_parsed_per_kind() {
        let n = build(&spec("n", FieldKind::Number, lit("3.5"), None)).unwrap();
        assert_eq!(n.value(), &FieldValue::Number(3.5));
        let b = build(&spec("b", FieldKind::Boolean, lit("TRUE"), None)).unwrap();
        assert_eq!(b.value(), &FieldValue::Boolean(true));
        let t = build(&spec("t", FieldKind::Time, lit("2024-01-15T09:30:00"), None)).unwrap();
        assert_eq!(t.default_format(), "09:30:00");
    }

    #[test]
    fn unparsable_number_names_field() {
        let err = build(&spec("count", FieldKind::Number, lit("many"), None)).unwrap_err();
        match err {
            FormError::ValueParse(e) => assert_eq!(e.id, "count"),
            other => panic!("expected ValueParse, got {other:?}"),
        }
    }

    #[test]
    fn expression_init() {
        let item = build(&spec(
            "n",
            FieldKind::Number,
            Some(ValueRule::Expression("6 * 7".into())),
            None,
        ))
        .unwrap();
        assert_eq!(item.default_format(), "42");
    }

    #[test]
    fn failing_init_expression_is_attributed() {
        let err = build(&spec(
            "x",
            FieldKind::Text,
            Some(ValueRule::Expression("error('nope')".into())),
            None,
        ))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to evaluate init-function for field x:"), "{msg}");
        assert!(msg.contains("nope"));
    }

    #[test]
    fn choice_selects_flagged_or_first() {
        let opts = r#"[
            {"k":"a","v":"Alpha"},
            {"k":"b","v":"Beta","s":true},
            {"k":"c","v":"Gamma","s":true}
        ]"#;
        let single = build(&spec("c", FieldKind::Choice, lit(opts), None)).unwrap();
        assert_eq!(single.default_format(), "Beta");

        let multi = build(&spec("m", FieldKind::MultiChoice, lit(opts), None)).unwrap();
        assert_eq!(multi.default_format(), "Beta, Gamma");

        let plain = build(&spec("p", FieldKind::Choice, lit(r#"[{"k":"a","v":"Alpha"}]"#), None))
            .unwrap();
        assert_eq!(plain.default_format(), "Alpha");
    }

    #[test]
    fn choice_needs_init() {
        assert!(matches!(
            build(&spec("c", FieldKind::Choice, None, None)),
            Err(FormError::ValueParse(_))
        ));
        assert!(matches!(
            build(&spec("c", FieldKind::Choice, lit("[]"), None)),
            Err(FormError::ValueParse(_))
        ));
    }

    #[test]
    fn date_template_without_braces_is_a_pattern() {
        let item = build(&spec(
            "d",
            FieldKind::Date,
            lit("2024-03-05"),
            Some(ValueRule::Template("%d.%m.%Y".into())),
        ))
        .unwrap();
        assert_eq!(resolve(&item, &Bindings::new()).unwrap(), "05.03.2024");
    }

    #[test]
    fn date_template_with_braces_renders() {
        let item = build(&spec(
            "d",
            FieldKind::Date,
            lit("2024-03-05"),
            Some(ValueRule::Template("on {{d}}".into())),
        ))
        .unwrap();
        let mut view = Bindings::new();
        view.insert("d".into(), item.raw_binding());
        assert_eq!(resolve(&item, &view).unwrap(), "on 2024-03-05");
    }

    #[test]
    fn invalid_date_pattern_is_a_format_error() {
        let item = build(&spec(
            "d",
            FieldKind::Date,
            lit("2024-03-05"),
            Some(ValueRule::Template("%Y-%".into())),
        ))
        .unwrap();
        assert!(matches!(resolve(&item, &Bindings::new()), Err(FormError::Format { .. })));
    }

    #[test]
    fn get_expression_failure_message() {
        let item = build(&spec(
            "x",
            FieldKind::Text,
            None,
            Some(ValueRule::Expression("view.missing.field".into())),
        ))
        .unwrap();
        let msg = resolve(&item, &Bindings::new()).unwrap_err().to_string();
        assert!(msg.starts_with("failed to evaluate get-function for field x:"), "{msg}");
    }

    #[test]
    fn path_items_visibility_and_sanitizing() {
        let name = FormItem::file_name(None);
        assert!(name.widget().is_some());

        let location = FormItem::file_location(None, "inbox/new");
        assert!(location.widget().is_none());
        assert_eq!(resolve(&location, &Bindings::new()).unwrap(), "inbox/new");

        let rule = ValueRule::Literal("a/b:c".into());
        let name = FormItem::file_name(Some(&rule));
        assert!(name.widget().is_none());
        assert_eq!(resolve(&name, &Bindings::new()).unwrap(), "abc");
    }

    #[test]
    fn edits_are_typed() {
        let mut n = build(&spec("n", FieldKind::Number, None, None)).unwrap();
        n.apply_edit(EditValue::Text("2.5".into())).unwrap();
        assert_eq!(n.default_format(), "2.5");
        assert!(n.apply_edit(EditValue::Text("x".into())).is_err());
        assert!(n.apply_edit(EditValue::Flag(true)).is_err());

        let mut d = build(&spec("d", FieldKind::DateTime, None, None)).unwrap();
        d.apply_edit(EditValue::Text("2024-01-02 03:04".into())).unwrap();
        assert_eq!(
            d.value(),
            &FieldValue::Timestamp(
                NaiveDateTime::parse_from_str("2024-01-02T03:04:00", "%Y-%m-%dT%H:%M:%S").unwrap()
            )
        );
    }

    #[test]
    fn choice_edits_use_keys() {
        let opts = r#"[{"k":"a","v":"Alpha"},{"k":"b","v":"Beta"}]"#;
        let mut multi = build(&spec("m", FieldKind::MultiChoice, lit(opts), None)).unwrap();
        multi.apply_edit(EditValue::Selection(vec!["b".into(), "a".into()])).unwrap();
        assert_eq!(multi.default_format(), "Alpha, Beta");
        assert_eq!(multi.raw_binding(), json!([{"k":"a","v":"Alpha"},{"k":"b","v":"Beta"}]));
        assert!(multi.apply_edit(EditValue::Selection(vec!["z".into()])).is_err());

        let mut single = build(&spec("c", FieldKind::Choice, lit(opts), None)).unwrap();
        single.apply_edit(EditValue::Text("b".into())).unwrap();
        assert_eq!(single.widget().unwrap().selected, vec!["b".to_string()]);
        assert!(single.apply_edit(EditValue::Selection(vec![])).is_err());
    }

    #[test]
    fn headless_items_reject_edits() {
        let mut item = build(&FieldSpec {
            id: "h".into(),
            kind: FieldKind::Text,
            init_rule: None,
            get_rule: None,
            display: None,
        })
        .unwrap();
        assert!(item.widget().is_none());
        assert!(matches!(
            item.apply_edit(EditValue::Text("x".into())),
            Err(FormError::InvalidEdit { .. })
        ));
    }
}

//! Form hosts for the terminal.
//!
//! [`DialoguerHost`] draws one dialoguer prompt per widget. [`BatchHost`]
//! never prompts and submits the `--var` values given on the command line,
//! which is what scripts and tests use.

use dialoguer::{Confirm, Editor, Input, MultiSelect, Select, theme::ColorfulTheme};
use mdform_core::form::{EditValue, FieldEdit, FormError, FormHost, FormOutcome, WidgetSpec};
use mdform_core::templates::FieldKind;
use std::io;
use tracing::debug;

/// Parse one `--var id=value` argument.
pub fn parse_var_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected id=value, got '{arg}'")),
    }
}

/// Submits preset values without user interaction.
#[derive(Debug, Default)]
pub struct BatchHost {
    vars: Vec<(String, String)>,
}

impl BatchHost {
    pub fn new(vars: Vec<(String, String)>) -> Self {
        Self { vars }
    }
}

impl FormHost for BatchHost {
    fn collect(&mut self, title: &str, widgets: &[WidgetSpec]) -> Result<FormOutcome, FormError> {
        debug!(form = title, widgets = widgets.len(), presets = self.vars.len(), "batch form");
        let edits = self
            .vars
            .drain(..)
            .map(|(id, value)| FieldEdit::new(id, EditValue::Text(value)))
            .collect();
        Ok(FormOutcome::Submitted(edits))
    }
}

/// Prompts for every widget in order, then asks for confirmation.
pub struct DialoguerHost {
    theme: ColorfulTheme,
}

impl DialoguerHost {
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }

    fn prompt(&self, widget: &WidgetSpec) -> Result<Option<EditValue>, FormError> {
        let label = prompt_label(widget);
        let value = match widget.kind {
            FieldKind::TextArea => {
                println!("{label} (opening editor)");
                Editor::new()
                    .edit(&widget.value)
                    .map_err(host_error)?
                    .map(EditValue::Text)
            }
            FieldKind::Boolean => Confirm::with_theme(&self.theme)
                .with_prompt(label)
                .default(widget.value == "true")
                .interact_opt()
                .map_err(host_error)?
                .map(EditValue::Flag),
            FieldKind::Choice => {
                let labels: Vec<&str> = widget.options.iter().map(|o| o.label.as_str()).collect();
                let current = widget
                    .options
                    .iter()
                    .position(|o| widget.selected.contains(&o.key))
                    .unwrap_or(0);
                Select::with_theme(&self.theme)
                    .with_prompt(label)
                    .items(&labels)
                    .default(current)
                    .interact_opt()
                    .map_err(host_error)?
                    .map(|i| EditValue::Selection(vec![widget.options[i].key.clone()]))
            }
            FieldKind::MultiChoice => {
                let labels: Vec<&str> = widget.options.iter().map(|o| o.label.as_str()).collect();
                let checked: Vec<bool> =
                    widget.options.iter().map(|o| widget.selected.contains(&o.key)).collect();
                MultiSelect::with_theme(&self.theme)
                    .with_prompt(label)
                    .items(&labels)
                    .defaults(&checked)
                    .interact_opt()
                    .map_err(host_error)?
                    .map(|picked| {
                        EditValue::Selection(
                            picked.into_iter().map(|i| widget.options[i].key.clone()).collect(),
                        )
                    })
            }
            FieldKind::Text
            | FieldKind::Number
            | FieldKind::Date
            | FieldKind::Time
            | FieldKind::DateTime => {
                let input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(label)
                    .with_initial_text(widget.value.clone())
                    .allow_empty(true)
                    .interact_text();
                match input {
                    Ok(text) => Some(EditValue::Text(text)),
                    Err(e) if is_cancel(&e) => None,
                    Err(e) => return Err(host_error(e)),
                }
            }
        };
        Ok(value)
    }
}

impl Default for DialoguerHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FormHost for DialoguerHost {
    fn collect(&mut self, title: &str, widgets: &[WidgetSpec]) -> Result<FormOutcome, FormError> {
        println!("{title}");

        let mut edits = Vec::with_capacity(widgets.len());
        for widget in widgets {
            // Editor returns None when the buffer was not saved; keep the value.
            match self.prompt(widget)? {
                Some(value) => edits.push(FieldEdit::new(widget.id.clone(), value)),
                None if widget.kind == FieldKind::TextArea => {}
                None => return Ok(FormOutcome::Cancelled),
            }
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Create note?")
            .default(true)
            .interact_opt()
            .map_err(host_error)?;
        Ok(match confirmed {
            Some(true) => FormOutcome::Submitted(edits),
            _ => FormOutcome::Cancelled,
        })
    }
}

fn prompt_label(widget: &WidgetSpec) -> String {
    let mut label = widget.title.clone();
    if let Some(description) = widget.description.as_deref().filter(|d| !d.is_empty()) {
        label.push_str(&format!(" ({description})"));
    }
    let placeholder = widget.placeholder.as_deref().filter(|p| !p.is_empty());
    if let Some(placeholder) = placeholder.filter(|_| widget.value.is_empty()) {
        label.push_str(&format!(" [{placeholder}]"));
    }
    label
}

fn is_cancel(e: &dialoguer::Error) -> bool {
    match e {
        dialoguer::Error::IO(io_err) => matches!(
            io_err.kind(),
            io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted
        ),
    }
}

fn host_error(e: impl std::fmt::Display) -> FormError {
    FormError::Host(e.to_string())
}

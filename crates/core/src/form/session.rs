//! A form session: the live item set for one template invocation.

use tracing::{debug, info};

use crate::scripting::ExpressionEvaluator;
use crate::templates::definition::TemplateDefinition;
use crate::templates::engine::{RenderContext, TemplateRenderer};

use super::errors::FormError;
use super::item::{EditValue, FormItem, ResolveEnv, WidgetSpec};
use super::resolver::resolve_view_model;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Output location used when the template has no `file-location` rule.
    pub default_output_dir: String,
}

/// One edit relayed by a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub id: String,
    pub value: EditValue,
}

impl FieldEdit {
    pub fn new(id: impl Into<String>, value: EditValue) -> Self {
        Self { id: id.into(), value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted(Vec<FieldEdit>),
    Cancelled,
}

/// Presents widgets to the user and relays their edits back.
pub trait FormHost {
    fn collect(&mut self, title: &str, widgets: &[WidgetSpec]) -> Result<FormOutcome, FormError>;
}

#[derive(Debug, Clone)]
pub struct FormSession {
    title: String,
    items: Vec<FormItem>,
}

impl FormSession {
    /// Build the output path items followed by one item per field.
    ///
    /// Fails on the first field whose init value cannot be computed.
    pub fn new(
        template: &TemplateDefinition,
        options: &SessionOptions,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Self, FormError> {
        let mut items = Vec::with_capacity(template.fields.len() + 2);
        items.push(FormItem::file_name(template.file_name_rule.as_ref()));
        items.push(FormItem::file_location(
            template.file_location_rule.as_ref(),
            &options.default_output_dir,
        ));

        for spec in &template.fields {
            items.push(FormItem::from_spec(spec, evaluator)?);
        }

        debug!(template = %template.name, items = items.len(), "form session created");
        Ok(Self { title: template.name.clone(), items })
    }

    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    /// Widgets for every displayed item, in session order.
    pub fn widgets(&self) -> Vec<WidgetSpec> {
        self.items.iter().filter_map(FormItem::widget).collect()
    }

    pub fn apply(&mut self, edit: FieldEdit) -> Result<(), FormError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == edit.id)
            .ok_or_else(|| FormError::UnknownField(edit.id.clone()))?;
        item.apply_edit(edit.value)
    }

    /// Show the form through `host` and apply the submitted edits.
    ///
    /// Returns `false` when the user cancelled.
    pub fn run(&mut self, host: &mut dyn FormHost) -> Result<bool, FormError> {
        let widgets = self.widgets();
        match host.collect(&self.title, &widgets)? {
            FormOutcome::Submitted(edits) => {
                info!(template = %self.title, edits = edits.len(), "form submitted");
                for edit in edits {
                    self.apply(edit)?;
                }
                Ok(true)
            }
            FormOutcome::Cancelled => {
                info!(template = %self.title, "form cancelled");
                Ok(false)
            }
        }
    }

    /// Resolve the current values into the view model.
    pub fn resolve(
        &self,
        evaluator: &dyn ExpressionEvaluator,
        renderer: &dyn TemplateRenderer,
    ) -> Result<RenderContext, FormError> {
        resolve_view_model(&self.items, ResolveEnv { evaluator, renderer })
    }
}

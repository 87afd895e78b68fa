//! Resolution of form items into the flat view model.

use serde_json::Value;
use tracing::debug;

use crate::scripting::Bindings;
use crate::templates::engine::RenderContext;

use super::errors::FormError;
use super::item::{FormItem, ResolveEnv};

/// Resolve every item into `id -> text`.
///
/// Ordinary items are resolved first, in declaration order, against the raw
/// current values of all ordinary items. The output path items run last and
/// see the resolved values instead, plus any path item resolved before them.
/// Ordinary items never see path items. There is no dependency ordering: a
/// get rule reading another item always gets that item's raw value.
pub fn resolve_view_model(
    items: &[FormItem],
    env: ResolveEnv<'_>,
) -> Result<RenderContext, FormError> {
    let fields = || items.iter().filter(|item| !item.is_path_item());

    let raw: Bindings = fields().map(|item| (item.id().to_string(), item.raw_binding())).collect();
    debug!(count = raw.len(), "collected raw bindings");

    let mut result = RenderContext::with_capacity(items.len());
    let mut resolved = Bindings::new();
    for item in fields() {
        let text = item.resolve_get(&raw, env)?;
        resolved.insert(item.id().to_string(), Value::String(text.clone()));
        result.insert(item.id().to_string(), text);
    }

    for item in items.iter().filter(|item| item.is_path_item()) {
        let text = item.resolve_get(&resolved, env)?;
        debug!(id = item.id(), value = %text, "resolved output path item");
        resolved.insert(item.id().to_string(), Value::String(text.clone()));
        result.insert(item.id().to_string(), text);
    }

    Ok(result)
}

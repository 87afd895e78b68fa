use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use thiserror::Error;
use tracing::debug;

use crate::dates::{evaluate_date_expr, is_date_expr};

#[derive(Debug, Error)]
pub enum TemplateRenderError {
    #[error("invalid regex for template placeholder: {0}")]
    Regex(String),
}

pub type RenderContext = HashMap<String, String>;

/// The `{{var}}` substitution engine used for bodies and `t:` rules.
pub trait TemplateRenderer {
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateRenderError>;
}

/// Default renderer backed by [`render_string`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateRenderError> {
        render_string(template, ctx)
    }
}

/// Check whether the text contains at least one `{{...}}` directive.
pub fn has_placeholder(text: &str) -> bool {
    placeholder_regex().map(|re| re.is_match(text)).unwrap_or(false)
}

static PLACEHOLDER_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}"));

fn placeholder_regex() -> Result<&'static Regex, TemplateRenderError> {
    PLACEHOLDER_RE.as_ref().map_err(|e| TemplateRenderError::Regex(e.to_string()))
}

/// Render a string template with variable substitution.
///
/// Values are inserted verbatim, without any escaping.
///
/// Supports:
/// - Simple variables: `{{var_name}}`
/// - Filters: `{{var_name | filter}}` (slugify, lower, upper, trim)
/// - Date expressions when no variable matches: `{{today + 1d}}`, `{{now | %H:%M}}`
///
/// Unknown placeholders are left intact.
pub fn render_string(
    template: &str,
    ctx: &RenderContext,
) -> Result<String, TemplateRenderError> {
    let re = placeholder_regex()?;

    let result = re.replace_all(template, |caps: &regex::Captures<'_>| {
        let expr = caps[1].trim();

        if let Some(value) = ctx.get(expr) {
            return value.clone();
        }

        if let Some((var_name, filter)) = parse_filter_expr(expr)
            && let Some(value) = ctx.get(var_name)
        {
            return apply_filter(value, filter);
        }

        if is_date_expr(expr) {
            match evaluate_date_expr(expr) {
                Ok(value) => return value,
                Err(e) => debug!(expr, error = %e, "date expression left unrendered"),
            }
        }

        caps[0].to_string()
    });

    Ok(result.into_owned())
}

/// Parse a filter expression like "var_name | filter_name".
fn parse_filter_expr(expr: &str) -> Option<(&str, &str)> {
    let (var_name, filter) = expr.split_once('|')?;
    let var_name = var_name.trim();
    let filter = filter.trim();
    if var_name.is_empty() || filter.is_empty() {
        return None;
    }
    Some((var_name, filter))
}

fn apply_filter(value: &str, filter: &str) -> String {
    match filter {
        "slugify" => slugify(value),
        "lowercase" | "lower" => value.to_lowercase(),
        "uppercase" | "upper" => value.to_uppercase(),
        "trim" => value.trim().to_string(),
        _ => value.to_string(),
    }
}

/// Convert a string to a URL-friendly slug.
fn slugify(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
        } else if (c == ' ' || c == '_' || c == '-') && !result.ends_with('-') {
            result.push('-');
        }
    }

    result.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> RenderContext {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn replaces_known_variables() {
        let out = render_string("Hello {{name}}!", &ctx(&[("name", "World")])).unwrap();
        assert_eq!(out, "Hello World!");
    }

    #[test]
    fn tolerates_inner_whitespace() {
        let out = render_string("{{ name }}", &ctx(&[("name", "x")])).unwrap();
        assert_eq!(out, "x");
    }

    #[test]
    fn leaves_unknown_variables_intact() {
        let out = render_string("{{a}} {{b}}", &ctx(&[("a", "1")])).unwrap();
        assert_eq!(out, "1 {{b}}");
    }

    #[test]
    fn inserts_markup_verbatim() {
        let out = render_string("{{link}}", &ctx(&[("link", "<a href=\"x\">&</a>")])).unwrap();
        assert_eq!(out, "<a href=\"x\">&</a>");
    }

    #[test]
    fn bound_variable_wins_over_date_builtin() {
        let out = render_string("{{today}}", &ctx(&[("today", "custom")])).unwrap();
        assert_eq!(out, "custom");
    }

    #[test]
    fn date_builtin_when_unbound() {
        let out = render_string("{{today}}", &RenderContext::new()).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out.chars().nth(4), Some('-'));
    }

    #[test]
    fn unformattable_date_pattern_is_left_intact() {
        let out = render_string("at {{today | %Z}}", &RenderContext::new()).unwrap();
        assert_eq!(out, "at {{today | %Z}}");
    }

    #[test]
    fn filters() {
        let c = ctx(&[("title", "My New Task"), ("name", "  Hi  ")]);
        assert_eq!(render_string("{{title | slugify}}", &c).unwrap(), "my-new-task");
        assert_eq!(render_string("{{title | upper}}", &c).unwrap(), "MY NEW TASK");
        assert_eq!(render_string("{{name | trim}}", &c).unwrap(), "Hi");
        assert_eq!(render_string("{{title | unknown}}", &c).unwrap(), "My New Task");
    }

    #[test]
    fn missing_var_with_filter_left_intact() {
        let out = render_string("{{missing | slugify}}", &RenderContext::new()).unwrap();
        assert_eq!(out, "{{missing | slugify}}");
    }

    #[test]
    fn detects_placeholders() {
        assert!(has_placeholder("{{date}} notes"));
        assert!(!has_placeholder("%Y-%m-%d"));
        assert!(!has_placeholder("{single}"));
    }

    #[test]
    fn slugify_cases() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("foo_bar_baz"), "foo-bar-baz");
    }
}

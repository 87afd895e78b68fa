//! Lua bindings available to template expressions.
//!
//! This module provides the `form` global table with bindings to the date
//! and template rendering engines.

use mlua::{Function, Lua, Result as LuaResult, Table, Value};

use crate::dates::{self, evaluate_date_expr};
use crate::templates::engine::{RenderContext, render_string};

/// Register the `form` global table with all bindings.
///
/// After calling this function, Lua expressions can use:
/// - `form.date(expr, format?)` - Evaluate a date expression
/// - `form.render(template, context)` - Render templates with variables
pub fn register_form_table(lua: &Lua) -> LuaResult<()> {
    let form = lua.create_table()?;

    form.set("date", create_date_fn(lua)?)?;
    form.set("render", create_render_fn(lua)?)?;

    lua.globals().set("form", form)?;
    Ok(())
}

/// Create the `form.date(expr, format?)` function.
///
/// # Examples (in Lua)
///
/// ```lua
/// form.date("today")             -- "2025-12-29"
/// form.date("today + 7d")        -- "2026-01-05"
/// form.date("today", "%B %d")    -- "December 29"
/// form.date("now", "%H:%M")      -- "14:30"
/// ```
fn create_date_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (expr, format): (String, Option<String>)| {
        let result = match format {
            Some(pattern) => dates::evaluate_relative(&expr)
                .and_then(|value| dates::format_pattern(&value, &pattern)),
            None => evaluate_date_expr(&expr),
        };
        result.map_err(|e| mlua::Error::runtime(e.to_string()))
    })
}

/// Create the `form.render(template, context)` function.
///
/// ```lua
/// form.render("Hello {{name}}", { name = "World" })  -- "Hello World"
/// ```
fn create_render_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (template, ctx_table): (String, Table)| {
        let mut ctx = RenderContext::new();

        for pair in ctx_table.pairs::<String, Value>() {
            let (key, value) = pair?;
            let str_value = lua_value_to_string(&key, value)?;
            ctx.insert(key, str_value);
        }

        render_string(&template, &ctx).map_err(|e| mlua::Error::runtime(e.to_string()))
    })
}

/// Convert a Lua value to a string for use in template context.
fn lua_value_to_string(key: &str, value: Value) -> LuaResult<String> {
    match value {
        Value::String(s) => Ok(s.to_str()?.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Nil => Ok(String::new()),
        _ => Err(mlua::Error::runtime(format!(
            "context value for '{key}' must be string, number, boolean, or nil"
        ))),
    }
}

//! Lua scripting engine with sandboxing.
//!
//! This module provides a sandboxed Lua execution environment for the
//! `f:` expressions of template schemas.

use mlua::{Function, Lua, LuaSerdeExt, Result as LuaResult, StdLib, Value};
use tracing::debug;

use crate::form::value::format_number;

use super::bindings::register_form_table;
use super::types::{Bindings, SandboxConfig, ScriptingError};

/// A sandboxed Lua execution environment.
///
/// The engine provides access to date and render helpers through the `form`
/// global table while restricting dangerous operations like file I/O and
/// shell execution. Globals assigned by one expression stay visible to the
/// next one evaluated on the same engine.
///
/// # Example
///
/// ```rust
/// use mdform_core::scripting::LuaEngine;
///
/// let engine = LuaEngine::sandboxed().unwrap();
/// let result = engine.eval_init(r#"form.date("today + 7d")"#).unwrap();
/// println!("One week from now: {}", result);
/// ```
pub struct LuaEngine {
    lua: Lua,
}

impl LuaEngine {
    /// Create a new Lua engine with the given sandbox configuration.
    pub fn new(config: SandboxConfig) -> Result<Self, ScriptingError> {
        // Base functions (print, type, tostring, ...) are always loaded.
        let libs = StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH;

        let lua = Lua::new_with(libs, mlua::LuaOptions::default())?;

        if config.memory_limit > 0 {
            lua.set_memory_limit(config.memory_limit)?;
        }

        Self::apply_sandbox(&lua)?;
        register_form_table(&lua)?;

        Ok(Self { lua })
    }

    /// Create a new engine with default restrictive sandbox.
    pub fn sandboxed() -> Result<Self, ScriptingError> {
        Self::new(SandboxConfig::restricted())
    }

    /// Run an init expression with no arguments.
    pub fn eval_init(&self, code: &str) -> Result<serde_json::Value, ScriptingError> {
        let func = self.compile(code)?;
        let value = Self::call(func, ())?;
        match value {
            Value::Function(_) | Value::Thread(_) | Value::UserData(_) => Err(
                ScriptingError::UnexpectedResult(format!("init returned a {}", value.type_name())),
            ),
            other => Ok(self.lua.from_value(other)?),
        }
    }

    /// Run a get expression with the bindings exposed as `view`.
    pub fn eval_get(&self, code: &str, view: &Bindings) -> Result<String, ScriptingError> {
        let func = self.compile(code)?;
        let arg = self.lua.to_value(view)?;
        let value = Self::call(func, arg)?;
        value_to_text(value)
    }

    /// Compile `code` into a function of `view`.
    ///
    /// Expressions are tried first so `view.a .. view.b` works without an
    /// explicit `return`; statement bodies are the fallback.
    fn compile(&self, code: &str) -> Result<Function, ScriptingError> {
        let as_expr = format!("return function(view) return (\n{code}\n) end");
        match self.lua.load(as_expr).set_name("=expression").eval::<Function>() {
            Ok(func) => Ok(func),
            Err(mlua::Error::SyntaxError { .. }) => {
                debug!("expression did not parse, compiling as statement body");
                let as_body = format!("return function(view)\n{code}\nend");
                Ok(self.lua.load(as_body).set_name("=expression").eval::<Function>()?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Call `func`; a returned function is called again with the same args.
    fn call<A>(func: Function, args: A) -> Result<Value, ScriptingError>
    where
        A: mlua::IntoLuaMulti + Clone,
    {
        let value: Value = func.call(args.clone())?;
        match value {
            Value::Function(inner) => Ok(inner.call(args)?),
            other => Ok(other),
        }
    }

    /// Apply sandbox restrictions by removing dangerous globals.
    fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
        let globals = lua.globals();

        globals.set("dofile", Value::Nil)?;
        globals.set("loadfile", Value::Nil)?;
        globals.set("load", Value::Nil)?;
        globals.set("require", Value::Nil)?;
        globals.set("package", Value::Nil)?;
        globals.set("io", Value::Nil)?;
        globals.set("os", Value::Nil)?;
        globals.set("debug", Value::Nil)?;
        globals.set("collectgarbage", Value::Nil)?;

        Ok(())
    }
}

fn value_to_text(value: Value) -> Result<String, ScriptingError> {
    match value {
        Value::Nil => Ok(String::new()),
        Value::String(s) => Ok(s.to_str()?.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Number(n) => Ok(format_number(n)),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(ScriptingError::UnexpectedResult(format!(
            "get returned a {}, expected string, number or boolean",
            other.type_name()
        ))),
    }
}

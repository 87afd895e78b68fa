//! Capability boundary between form items and the scripting runtime.

use super::engine::LuaEngine;
use super::types::{Bindings, ScriptingError};

/// Evaluates the `f:` rules of a template.
///
/// Init rules take no arguments and may return any JSON-representable value;
/// get rules take the bindings map and return the final text.
pub trait ExpressionEvaluator {
    fn eval_init(&self, code: &str) -> Result<serde_json::Value, ScriptingError>;

    fn eval_get(&self, code: &str, view: &Bindings) -> Result<String, ScriptingError>;
}

impl ExpressionEvaluator for LuaEngine {
    fn eval_init(&self, code: &str) -> Result<serde_json::Value, ScriptingError> {
        LuaEngine::eval_init(self, code)
    }

    fn eval_get(&self, code: &str, view: &Bindings) -> Result<String, ScriptingError> {
        LuaEngine::eval_get(self, code, view)
    }
}

//! Lua expression support for template schemas.
//!
//! The `f:` rules of a schema are Lua snippets. Init rules are evaluated
//! with no arguments; get rules receive the current bindings as `view`.
//!
//! # Example
//!
//! ```rust
//! use mdform_core::scripting::{Bindings, LuaEngine};
//!
//! let engine = LuaEngine::sandboxed().unwrap();
//! let mut view = Bindings::new();
//! view.insert("title".into(), "Weekly".into());
//!
//! let name = engine.eval_get(r#"view.title .. " " .. form.date("today")"#, &view).unwrap();
//! println!("{}", name);
//! ```
//!
//! # Available Lua Functions
//!
//! - `form.date(expr, format?)` - Evaluate date expressions
//! - `form.render(template, context)` - Render templates with variables
//!
//! # Security
//!
//! The environment is sandboxed: `io`, `os`, `require`, `package`, `load`,
//! `loadfile`, `dofile`, `debug` and `collectgarbage` are removed and an
//! optional memory limit applies. There is no instruction or time limit, so
//! a looping expression blocks the caller.

pub mod bindings;
pub mod engine;
pub mod evaluator;
pub mod types;

pub use engine::LuaEngine;
pub use evaluator::ExpressionEvaluator;
pub use types::{Bindings, SandboxConfig, ScriptingError};

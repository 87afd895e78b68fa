//! Scripting types and error definitions.

use thiserror::Error;

use crate::config::ScriptingConfig;

/// Values visible to get-expressions as the `view` argument.
pub type Bindings = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur during Lua script execution.
#[derive(Debug, Error)]
pub enum ScriptingError {
    /// Error from the Lua runtime, including compile errors.
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// The script returned something the caller cannot use.
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

/// Configuration for the Lua sandbox.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum memory the Lua VM can allocate (in bytes). 0 = unlimited.
    pub memory_limit: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::restricted()
    }
}

impl SandboxConfig {
    /// A restrictive sandbox suitable for template expressions.
    pub fn restricted() -> Self {
        Self { memory_limit: 10 * 1024 * 1024 }
    }

    pub fn unrestricted() -> Self {
        Self { memory_limit: 0 }
    }
}

impl From<&ScriptingConfig> for SandboxConfig {
    fn from(cfg: &ScriptingConfig) -> Self {
        Self { memory_limit: cfg.memory_limit }
    }
}

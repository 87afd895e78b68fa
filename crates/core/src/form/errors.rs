//! Errors raised while building or resolving a form session.

use std::fmt;

use thiserror::Error;

use crate::dates::DateError;
use crate::templates::engine::TemplateRenderError;

/// A literal or computed init value could not be coerced to the field kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to parse init value for field '{id}': {message}")]
pub struct ValueParseError {
    pub id: String,
    pub message: String,
}

impl ValueParseError {
    pub fn new(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self { id: id.into(), message: message.to_string() }
    }
}

/// Which rule of a field an expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPhase {
    Init,
    Get,
}

impl fmt::Display for EvalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalPhase::Init => f.write_str("init-function"),
            EvalPhase::Get => f.write_str("get-function"),
        }
    }
}

/// A user expression failed to compile or run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to evaluate {phase} for field {id}: {message}")]
pub struct ExpressionEvaluationError {
    pub id: String,
    pub phase: EvalPhase,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    ValueParse(#[from] ValueParseError),

    #[error(transparent)]
    Evaluation(#[from] ExpressionEvaluationError),

    #[error("failed to format value of field {id}: {source}")]
    Format {
        id: String,
        #[source]
        source: DateError,
    },

    #[error("failed to render template of field {id}: {source}")]
    Render {
        id: String,
        #[source]
        source: TemplateRenderError,
    },

    #[error("form has no field '{0}'")]
    UnknownField(String),

    #[error("invalid value for field '{id}': {message}")]
    InvalidEdit { id: String, message: String },

    #[error("form input failed: {0}")]
    Host(String),
}

impl FormError {
    pub(crate) fn invalid_edit(id: &str, message: impl fmt::Display) -> Self {
        FormError::InvalidEdit { id: id.to_string(), message: message.to_string() }
    }
}

//! Form sessions built from template definitions.
//!
//! A session holds one [`FormItem`] per schema field plus the implicit
//! `fileName` and `fileLocation` items. Hosts draw the [`WidgetSpec`]s,
//! relay edits back, and the session resolves the final view model.

pub mod errors;
pub mod item;
pub mod resolver;
pub mod session;
pub mod value;

pub use errors::{EvalPhase, ExpressionEvaluationError, FormError, ValueParseError};
pub use item::{EditValue, FormItem, ItemRole, ResolveEnv, WidgetSpec};
pub use resolver::resolve_view_model;
pub use session::{FieldEdit, FormHost, FormOutcome, FormSession, SessionOptions};
pub use value::{ChoiceOption, FieldValue};

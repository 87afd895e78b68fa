//! Template documents: parsing, discovery, the index and rendering.

pub mod definition;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod index;
pub mod parser;
pub mod pipeline;

pub use definition::{
    FILE_LOCATION_ID, FILE_NAME_ID, FieldKind, FieldSpec, FormDisplay, RuleSlot,
    TemplateDefinition, ValueRule,
};
pub use discovery::{DiscoveryReport, discover_templates};
pub use engine::{PlaceholderRenderer, RenderContext, TemplateRenderer, render_string};
pub use errors::{
    DocumentError, FieldValidationError, SchemaParseError, TemplateDiscoveryError,
    TemplateParseError,
};
pub use index::{REBUILD_COMMAND_ID, TemplateCommand, TemplateIndex, TemplateIndexError};
pub use parser::{ParsedSchema, SchemaParser};
pub use pipeline::{RenderError, RenderedDocument, render_document};

//! Frontmatter splitting for template documents.
//!
//! This module provides functionality to:
//! - Split a markdown document into its frontmatter block and body
//! - Cut the form schema property out of the frontmatter text

pub mod parser;

pub use parser::{FrontmatterSplit, PropertyBlock, extract_object_property, split};

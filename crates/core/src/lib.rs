#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Core library for mdform.
//!
//! Turns markdown templates that carry a form schema in their frontmatter
//! into typed form sessions, resolves the submitted answers into a view
//! model and renders the final note text.

pub mod codec;
pub mod config;
pub mod dates;
pub mod form;
pub mod frontmatter;
pub mod scripting;
pub mod templates;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

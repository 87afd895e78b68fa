pub mod doctor;
pub mod list_templates;
pub mod new;
pub mod reindex;

use color_eyre::eyre::{Result, WrapErr};
use mdform_core::config::loader::{ConfigLoader, default_config_path};
use mdform_core::config::types::ResolvedConfig;
use std::path::Path;

/// Load the active profile and start logging for the rest of the command.
pub(crate) fn load_config(config: Option<&Path>, profile: Option<&str>) -> Result<ResolvedConfig> {
    let rc = ConfigLoader::load(config, profile).wrap_err_with(|| match config {
        Some(path) => format!("could not load config {}", path.display()),
        None => format!("could not load config (looked for {})", default_config_path().display()),
    })?;
    crate::logging::init(&rc)?;
    Ok(rc)
}

//! Reindex command implementation.

use super::load_config;
use color_eyre::eyre::{Result, WrapErr};
use mdform_core::templates::{REBUILD_COMMAND_ID, SchemaParser, TemplateIndex, discover_templates};
use std::path::Path;
use tracing::info;

/// Rescan the templates folder and replace the stored index.
pub fn run(config: Option<&Path>, profile: Option<&str>) -> Result<()> {
    let rc = load_config(config, profile)?;

    let parser = SchemaParser::new(rc.template_property.as_str());
    let report = discover_templates(&rc.templates_dir, &parser)?;

    let index = TemplateIndex::new(report.templates);
    index
        .save(&rc.index_path)
        .wrap_err("could not store the template index")?;
    info!(
        templates = index.templates.len(),
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        "template index rebuilt"
    );

    println!("OK   mdf reindex");
    println!("templates_dir: {}", rc.templates_dir.display());
    println!("index_file: {}", rc.index_path.display());
    println!("commands:");
    for command in index.commands() {
        println!("  {:<24} {}", command.id, command.name);
    }
    println!("  {:<24} Rebuild template index", REBUILD_COMMAND_ID);

    for path in &report.skipped {
        println!("skipped: {} (no frontmatter)", path.display());
    }
    for failure in &report.failures {
        println!("failed: {failure}");
    }
    println!(
        "-- {} templates, {} skipped, {} failed --",
        index.templates.len(),
        report.skipped.len(),
        report.failures.len()
    );
    Ok(())
}

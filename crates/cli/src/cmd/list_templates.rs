use super::load_config;
use color_eyre::eyre::{Result, WrapErr};
use mdform_core::templates::TemplateIndex;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "COMMAND")]
    command: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "FIELDS")]
    fields: usize,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, json: bool) -> Result<()> {
    let rc = load_config(config, profile)?;
    let index = TemplateIndex::load(&rc.index_path).wrap_err("could not read the template index")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.templates.is_empty() {
        println!("No templates indexed. Run `mdf reindex` first.");
        return Ok(());
    }

    let rows: Vec<TemplateRow> = index
        .commands()
        .into_iter()
        .zip(&index.templates)
        .map(|(command, template)| TemplateRow {
            command: command.id,
            name: command.name,
            source: template.source.display().to_string(),
            fields: template.fields.len(),
        })
        .collect();

    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("-- {} templates --", rows.len());
    Ok(())
}

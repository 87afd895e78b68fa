use super::load_config;
use color_eyre::eyre::Result;
use mdform_core::config::loader::default_config_path;
use mdform_core::templates::TemplateIndex;
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) -> Result<()> {
    let rc = load_config(config, profile)?;

    println!("OK   mdf doctor");
    let path = config.map_or_else(default_config_path, Path::to_path_buf);
    println!("path: {}", path.display());
    println!("profile: {}", rc.active_profile);
    println!("vault_root: {}", rc.vault_root.display());
    println!("templates_dir: {}", rc.templates_dir.display());
    let output_dir = if rc.output_dir.is_empty() { "<vault root>" } else { rc.output_dir.as_str() };
    println!("output_dir: {output_dir}");
    println!("template_property: {}", rc.template_property);
    println!("note_extension: {}", rc.note_extension);
    println!("index_file: {}", rc.index_path.display());

    match TemplateIndex::load(&rc.index_path) {
        Ok(index) if index.indexed_at.is_none() => println!("index: not built (run `mdf reindex`)"),
        Ok(index) => println!("index: {} templates", index.templates.len()),
        Err(e) => println!("index: unreadable ({e})"),
    }

    if !rc.templates_dir.is_dir() {
        println!("warning: templates_dir does not exist");
    }
    println!(
        "scripting.memory_limit: {}",
        match rc.scripting.memory_limit {
            0 => "unlimited".to_string(),
            n => format!("{n} bytes"),
        }
    );
    Ok(())
}

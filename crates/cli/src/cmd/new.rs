use super::load_config;
use crate::NewArgs;
use crate::prompt::{BatchHost, DialoguerHost};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use mdform_core::form::{EditValue, FieldEdit, FormSession, SessionOptions};
use mdform_core::scripting::{LuaEngine, SandboxConfig};
use mdform_core::templates::{PlaceholderRenderer, TemplateIndex, render_document};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing::debug;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: NewArgs) -> Result<()> {
    let rc = load_config(config, profile)?;
    let index = TemplateIndex::load(&rc.index_path).wrap_err("could not read the template index")?;
    let template = index
        .find(&args.template)
        .wrap_err("unknown template (run `mdf reindex` after adding templates)")?;
    debug!(template = %template.name, source = %template.source.display(), "creating note");

    let lua = LuaEngine::new(SandboxConfig::from(&rc.scripting))
        .map_err(|e| eyre!("could not start the expression sandbox: {e}"))?;
    let options = SessionOptions { default_output_dir: rc.output_dir.clone() };
    let mut session = FormSession::new(template, &options, &lua)
        .wrap_err_with(|| format!("could not open the form of '{}'", template.name))?;

    let interactive = !args.batch && io::stdin().is_terminal();
    let submitted = if interactive {
        for (id, value) in args.vars {
            session.apply(FieldEdit::new(id, EditValue::Text(value)))?;
        }
        session.run(&mut DialoguerHost::new())?
    } else {
        session.run(&mut BatchHost::new(args.vars))?
    };
    if !submitted {
        println!("Cancelled.");
        return Ok(());
    }

    let view = session.resolve(&lua, &PlaceholderRenderer)?;
    let document = render_document(template, &view, &PlaceholderRenderer, &rc.note_extension)?;

    if args.dry_run {
        eprintln!("would write: {}", document.output_path.display());
        print!("{}", document.text);
        return Ok(());
    }

    let target = rc.vault_root.join(&document.output_path);
    if target.exists() {
        bail!("refusing to overwrite existing note {}", target.display());
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("could not create {}", parent.display()))?;
    }
    fs::write(&target, &document.text)
        .wrap_err_with(|| format!("could not write {}", target.display()))?;

    println!("OK   mdf new");
    println!("template: {}", template.name);
    println!("output: {}", target.display());
    Ok(())
}

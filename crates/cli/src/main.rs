mod cmd;
mod logging;
mod prompt;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mdf", version, about = "Create markdown notes from form templates")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Scan templates_dir and rebuild the template index
    Reindex,

    /// List the indexed templates and their commands
    ListTemplates {
        /// Print the index as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fill a template's form and create the resulting note
    New(NewArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Doctor => "doctor",
            Commands::Reindex => "reindex",
            Commands::ListTemplates { .. } => "list-templates",
            Commands::New(_) => "new",
        }
    }
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Template display name, command id (use-template-N) or source path
    #[arg(long)]
    pub template: String,

    /// Preset a field value (repeatable): --var id=value
    #[arg(long = "var", value_parser = prompt::parse_var_arg)]
    pub vars: Vec<(String, String)>,

    /// Never prompt; use defaults and --var values only
    #[arg(long)]
    pub batch: bool,

    /// Print the rendered note instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

fn main() {
    let _ = color_eyre::install();

    let cli = Cli::parse();
    let name = cli.command.name();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    let result = match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Reindex => cmd::reindex::run(config, profile),
        Commands::ListTemplates { json } => cmd::list_templates::run(config, profile, json),
        Commands::New(args) => cmd::new::run(config, profile, args),
    };

    if let Err(report) = result {
        println!("FAIL mdf {name}");
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

//! mdvars - Variable expansion for Markdown documents
//!
//! Commands:
//! - process [FILE]: Expand placeholders in a document
//! - set/get/unset/list: Manage global variables
//! - load <FILE> / export: Exchange global variables as YAML
//! - check [FILE]: Report placeholders that would stay unexpanded
//! - serve: JSON-RPC over stdio

mod cli;

use anyhow::Result;
use clap::Parser;
use mdvars_core::Paths;
use tracing_subscriber::EnvFilter;

use cli::{App, Cli, Commands};

fn main() -> Result<()> {
    // Logging goes to stderr so stdout stays clean for documents and the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::load(Paths::new())?;

    match cli.command {
        Commands::Process { file, output } => {
            cli::cmd_process(&app, file.as_deref(), output.as_deref())
        }
        Commands::Set { name, value } => cli::cmd_set(&app, &name, &value),
        Commands::Get { name } => cli::cmd_get(&app, &name),
        Commands::Unset { name } => cli::cmd_unset(&app, &name),
        Commands::List { json } => cli::cmd_list(&app, json),
        Commands::Load { file } => cli::cmd_load(&app, &file),
        Commands::Export { output } => cli::cmd_export(&app, output.as_deref()),
        Commands::Check { file } => {
            if !cli::cmd_check(&app, file.as_deref())? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cli::cmd_serve(&app))
        }
    }
}

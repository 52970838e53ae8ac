//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use super::output::{Output, OutputFormat};
use super::{plugin_cmd, resource_cmd};
use crate::domain::Family;
use crate::plugin::{register_builtins, Registry};
use crate::storage::Library;

#[derive(Parser)]
#[command(name = "lode")]
#[command(author, version, about = "Local-first library for typed content resources")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long = "format", short = 'f', global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (defaults to the per-user data dir)
    #[arg(long, global = true, env = "LODE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a resource and print its uuid
    Add {
        family: Family,

        /// Declared content format (e.g. text/plain)
        format: String,

        /// Initial fields as a JSON object
        #[arg(long)]
        json: Option<String>,
    },

    /// Remove a resource
    Remove { family: Family, uuid: Uuid },

    /// Merge fields into a resource
    Modify {
        family: Family,
        uuid: Uuid,

        /// Fields to merge, as a JSON object
        data: String,
    },

    /// Merge plugin-private fields into a resource's extra namespace
    ModifyExtra {
        family: Family,
        uuid: Uuid,

        /// Plugin id owning the namespace
        field: String,

        /// Fields to merge, as a JSON object
        data: String,
    },

    /// List a family's resources
    List { family: Family },

    /// Inspect registered plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),

    /// List the known plugin families
    Families,
}

/// Parses arguments and runs the requested command
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let output = Output::new(cli.output);

    let library = match &cli.data_dir {
        Some(dir) => Library::new(dir),
        None => Library::open_default()?,
    };

    let registry = Registry::new();
    register_builtins(&registry);

    match cli.command {
        Commands::Add {
            family,
            format,
            json,
        } => resource_cmd::add(&library, &registry, &output, family, &format, json.as_deref()),
        Commands::Remove { family, uuid } => {
            resource_cmd::remove(&library, &registry, &output, family, uuid)
        }
        Commands::Modify { family, uuid, data } => {
            resource_cmd::modify(&library, &output, family, uuid, &data)
        }
        Commands::ModifyExtra {
            family,
            uuid,
            field,
            data,
        } => resource_cmd::modify_extra(&library, &output, family, uuid, &field, &data),
        Commands::List { family } => resource_cmd::list(&library, &output, family),
        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &library, &registry, &output),
        Commands::Families => plugin_cmd::families(&registry, &output),
    }
}

fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

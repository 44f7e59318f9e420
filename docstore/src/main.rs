//! Command-line front end for the documentation store.
//!
//! Commands print JSON on stdout, except `changelog` which prints the page
//! itself. Failures are reported as JSON on stderr next to the logs.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use docstore::{DocStore, ErrorCode, Profile, ProjectFilter, StoreConfig, StoreError};

#[derive(Parser)]
#[command(name = "docstore")]
#[command(about = "Docstore - Self-hosted versioned documentation store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON) overlaid on the profile defaults
    #[arg(long, default_value = "docstore.json", global = true)]
    config: PathBuf,

    /// Storage root, overriding the configured docfiles_dir
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a project from a JSON request file
    Register {
        /// Path to the registration request
        request: PathBuf,
    },

    /// Upload a <name>-<version>.zip documentation archive
    Upload {
        /// Archive to upload
        archive: PathBuf,

        /// Project unique key
        #[arg(long)]
        key: String,

        /// Replace the version if it already exists
        #[arg(long)]
        reupload: bool,
    },

    /// Delete one version of a project
    Delete {
        project: String,
        version: String,

        /// Project unique key
        #[arg(long)]
        key: String,
    },

    /// List all projects
    List,

    /// Search projects by name pattern, language or tag
    Search {
        /// Regular expression matched from the start of the project name
        #[arg(long)]
        pattern: Option<String>,

        /// Programming language
        #[arg(long)]
        lang: Option<String>,

        /// Tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Print the directory of a project's newest version
    Latest { project: String },

    /// Print a project's changelog
    Changelog { project: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to encode output")?
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let profile = match env::var("DOCSTORE_RUNENV") {
        Ok(value) => value
            .parse::<Profile>()
            .map_err(anyhow::Error::msg)
            .context("Invalid DOCSTORE_RUNENV")?,
        Err(_) => Profile::default(),
    };

    let mut config = StoreConfig::load_or_default(&cli.config, profile)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(root) = &cli.root {
        config.docfiles_dir = root.clone();
    }

    debug!(config = ?config, profile = ?profile, "Resolved configuration");
    Ok(config)
}

fn run(cli: Cli) -> Result<bool> {
    let store = DocStore::new(Arc::new(load_config(&cli)?));

    match cli.command {
        Commands::Register { request } => {
            let raw = fs::read_to_string(&request)
                .with_context(|| format!("Failed to read {}", request.display()))?;
            let payload = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON in {}", request.display()))?;
            print_json(&store.register_json(&payload)?)?;
            Ok(true)
        }

        Commands::Upload {
            archive,
            key,
            reupload,
        } => {
            let outcome = store
                .upload_file(&archive, &key, reupload)
                .with_context(|| format!("Failed to upload {}", archive.display()))?;
            print_json(&outcome)?;
            Ok(outcome.is_ok())
        }

        Commands::Delete {
            project,
            version,
            key,
        } => {
            let outcome = store.delete_version(&project, &version, &key)?;
            print_json(&outcome)?;
            Ok(outcome.ok)
        }

        Commands::List => {
            print_json(&store.list_all()?)?;
            Ok(true)
        }

        Commands::Search { pattern, lang, tag } => {
            let filter = ProjectFilter { pattern, lang, tag };
            print_json(&store.search(&filter)?)?;
            Ok(true)
        }

        Commands::Latest { project } => {
            let dir = store.latest_dir(&project)?;
            let found = dir.is_some();
            print_json(&serde_json::json!({ "project": project, "latest": dir }))?;
            Ok(found)
        }

        Commands::Changelog { project } => match store.changelog(&project)? {
            Some(text) => {
                print!("{text}");
                Ok(true)
            }
            None => {
                eprintln!("No changelog for project '{project}'");
                Ok(false)
            }
        },
    }
}

fn main() -> ExitCode {
    let _guard = docstore_logging::init_subscriber();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let code = e
                .downcast_ref::<StoreError>()
                .map_or(ErrorCode::InternalError, StoreError::error_code);
            eprintln!(
                "{}",
                serde_json::json!({ "error": code.as_str(), "message": format!("{e:#}") })
            );
            ExitCode::FAILURE
        }
    }
}

//! Inkwell CLI - push local Markdown documents to a remote CMS
//!
//! Re-running only pushes what changed; per-document revision state lives
//! in a local SQLite database.

mod commands;
mod config;
mod confirm;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use inkwell_core::db::Database;
use inkwell_core::remote::HttpRemoteClient;

use crate::commands::ListTarget;
use crate::config::RuntimeConfig;
use crate::confirm::{AlwaysConfirm, Confirmer, StdinConfirmer};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "inkwell")]
#[command(about = "Sync local Markdown documents to a remote CMS")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to the local sync database
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a document or a directory of documents
    Sync {
        /// Markdown file or directory to sync
        path: PathBuf,
        /// Also publish each synced draft
        #[arg(long)]
        publish: bool,
    },
    /// Publish the latest draft of an already-synced document
    Publish {
        /// Markdown file whose draft should go live
        path: PathBuf,
    },
    /// Delete a document's remote publication
    Delete {
        /// Markdown file whose publication should be removed
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show local sync bookkeeping for a document
    Status {
        /// Markdown file to inspect
        path: PathBuf,
    },
    /// List remote drafts or publications
    List {
        #[command(subcommand)]
        target: ListTarget,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inkwell_core=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let config = RuntimeConfig::from_env(cli.db_path)?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&config.db_path)?;
    let remote = HttpRemoteClient::new(config.remote.clone())?;

    match cli.command {
        Commands::Sync { path, publish } => {
            commands::run_sync(&db, &remote, &config.defaults, &path, publish).await
        }
        Commands::Publish { path } => {
            commands::run_publish(&db, &remote, &config.defaults, &path).await
        }
        Commands::Delete { path, yes } => {
            let confirmer: &dyn Confirmer = if yes { &AlwaysConfirm } else { &StdinConfirmer };
            commands::run_delete(&db, &remote, &config.defaults, &path, confirmer).await
        }
        Commands::Status { path } => commands::run_status(&db, &remote, &config.defaults, &path),
        Commands::List { target } => commands::run_list(&remote, target).await,
    }
}

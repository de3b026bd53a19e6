use clap::Subcommand;
use inkwell_core::remote::{HttpRemoteClient, RemoteApi};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ListTarget {
    /// List remote drafts
    Drafts {
        #[arg(long, default_value = "0")]
        offset: u32,
        #[arg(short, long, default_value = "20")]
        count: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List remote publications
    Publications {
        #[arg(long, default_value = "0")]
        offset: u32,
        #[arg(short, long, default_value = "20")]
        count: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run_list(remote: &HttpRemoteClient, target: ListTarget) -> Result<(), CliError> {
    match target {
        ListTarget::Drafts {
            offset,
            count,
            json,
        } => {
            let drafts = remote.list_drafts(offset, count).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&drafts)?);
                return Ok(());
            }
            if drafts.is_empty() {
                println!("No drafts.");
            }
            for draft in drafts {
                println!("{}  {}", draft.token, draft.title);
            }
        }
        ListTarget::Publications {
            offset,
            count,
            json,
        } => {
            let publications = remote.list_publications(offset, count).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&publications)?);
                return Ok(());
            }
            if publications.is_empty() {
                println!("No publications.");
            }
            for publication in publications {
                println!(
                    "{}  {}  {:?}",
                    publication.token, publication.title, publication.status
                );
            }
        }
    }
    Ok(())
}

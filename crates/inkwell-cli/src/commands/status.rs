use std::path::Path;

use inkwell_core::db::{Database, SqliteSyncStore};
use inkwell_core::remote::HttpRemoteClient;
use inkwell_core::resolve::DocumentDefaults;
use inkwell_core::SyncEngine;

use crate::error::CliError;

pub fn run_status(
    db: &Database,
    remote: &HttpRemoteClient,
    defaults: &DocumentDefaults,
    path: &Path,
) -> Result<(), CliError> {
    let store = SqliteSyncStore::new(db.connection());
    let engine = SyncEngine::new(&store, remote, defaults.clone());

    let status = engine.status(path)?;

    match status.document {
        Some(document) => {
            println!("document: {}", document.path);
            println!("fingerprint: {}", document.fingerprint);
        }
        None => {
            println!("document: {} (never synced)", path.display());
            return Ok(());
        }
    }

    match status.latest_draft {
        Some(draft) => println!("latest draft: {} (row {})", draft.token, draft.id),
        None => println!("latest draft: none"),
    }

    match status.publication {
        Some(publication) => println!("publication: {}", publication.token),
        None => println!("publication: none"),
    }

    Ok(())
}
